use std::time::Duration;

use crate::{CoordinatorState, Effect, Msg};

/// Title used for the order desktop notification.
pub const NOTIFICATION_TITLE: &str = "Sentinela - Nova Venda!";

/// How long an order notification stays up before auto-dismissal.
pub const DISMISS_AFTER: Duration = Duration::from_secs(30);

/// Pure update function: applies a message to state and returns any effects.
///
/// The check-then-set on the two dedup sets happens entirely inside one call,
/// so serializing calls (the runtime is single-threaded) makes it atomic with
/// respect to events from other tabs.
pub fn update(mut state: CoordinatorState, msg: Msg) -> (CoordinatorState, Vec<Effect>) {
    let effects = match msg {
        Msg::OrderFound {
            order_number,
            element_hash,
            tab_id,
        } => {
            if !state.is_monitoring() {
                return (state, Vec::new());
            }

            let unique_key = format!("{tab_id}-{element_hash}-{order_number}");
            if state.has_notified(&order_number) || state.has_processed(&unique_key) {
                return (state, Vec::new());
            }

            state.mark_processed(unique_key);
            state.record_notified(order_number.clone());

            vec![
                Effect::PersistOrders {
                    orders: state.notified_orders().to_vec(),
                },
                Effect::ShowNotification {
                    title: NOTIFICATION_TITLE.to_string(),
                    message: format!("Detectada venda com 2 unidades:\n{order_number}"),
                    order_number: order_number.clone(),
                    dismiss_after: DISMISS_AFTER,
                },
                Effect::PlayTabAlert {
                    tab_id,
                    order_number,
                },
            ]
        }
        // Informational channel with no response contract; the runtime logs
        // delivery.
        Msg::SizeAlert { .. } => Vec::new(),
        Msg::ToggleMonitoring => {
            let flag = !state.is_monitoring();
            state.set_monitoring(flag);
            state.clear_processed();
            vec![
                Effect::PersistMonitoring { is_monitoring: flag },
                Effect::BroadcastMonitoring { is_monitoring: flag },
            ]
        }
        Msg::ClearLog => {
            state.clear_log();
            vec![Effect::PersistOrders { orders: Vec::new() }]
        }
        Msg::RestoreState {
            is_monitoring,
            notified_orders,
        } => {
            state.restore(is_monitoring, notified_orders);
            Vec::new()
        }
    };

    (state, effects)
}
