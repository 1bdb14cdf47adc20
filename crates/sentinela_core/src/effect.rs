use std::time::Duration;

use crate::snapshot::TabId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Persist the monitoring flag.
    PersistMonitoring { is_monitoring: bool },
    /// Persist the full notified-order list.
    PersistOrders { orders: Vec<String> },
    /// Show a desktop notification, auto-dismissed after `dismiss_after`.
    ShowNotification {
        title: String,
        message: String,
        order_number: String,
        dismiss_after: Duration,
    },
    /// Ask the originating tab to play its alert cue and show the in-page
    /// notice. Best effort; the tab may have navigated away.
    PlayTabAlert { tab_id: TabId, order_number: String },
    /// Broadcast the monitoring flag to every registered tab, best effort.
    BroadcastMonitoring { is_monitoring: bool },
}
