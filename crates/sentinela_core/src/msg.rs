use crate::snapshot::TabId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A page watcher reported an order occurrence.
    OrderFound {
        order_number: String,
        element_hash: String,
        tab_id: TabId,
    },
    /// A page watcher reported a female > male size mismatch. Informational;
    /// the runtime logs it and the state machine leaves state untouched.
    SizeAlert {
        message: String,
        female_size: u32,
        male_size: u32,
        tab_id: TabId,
    },
    /// User toggled monitoring from the control surface.
    ToggleMonitoring,
    /// User cleared the notified-order log.
    ClearLog,
    /// Seed state from the persisted snapshot at startup.
    RestoreState {
        is_monitoring: bool,
        notified_orders: Vec<String>,
    },
}
