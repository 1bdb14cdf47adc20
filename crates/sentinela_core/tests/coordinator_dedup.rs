use std::sync::Once;

use sentinela_core::{update, CoordinatorState, Effect, Msg};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(watch_logging::initialize_for_tests);
}

fn order_found(order: &str, hash: &str, tab: u64) -> Msg {
    Msg::OrderFound {
        order_number: order.to_string(),
        element_hash: hash.to_string(),
        tab_id: tab,
    }
}

fn notification_count(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|effect| matches!(effect, Effect::ShowNotification { .. }))
        .count()
}

#[test]
fn first_detection_notifies_persists_and_pings_the_tab() {
    init_logging();
    let state = CoordinatorState::new();
    let (state, effects) = update(state, order_found("Venda #1234", "42", 7));

    assert_eq!(notification_count(&effects), 1);
    assert!(effects.iter().any(|effect| matches!(
        effect,
        Effect::PersistOrders { orders } if orders == &vec!["Venda #1234".to_string()]
    )));
    assert!(effects.iter().any(|effect| matches!(
        effect,
        Effect::PlayTabAlert { tab_id: 7, order_number } if order_number == "Venda #1234"
    )));
    assert_eq!(state.status().notified_orders_count, 1);
}

#[test]
fn identical_triple_notifies_exactly_once() {
    init_logging();
    let state = CoordinatorState::new();
    let (state, first) = update(state, order_found("Venda #1234", "42", 7));
    let (state, second) = update(state, order_found("Venda #1234", "42", 7));

    assert_eq!(notification_count(&first), 1);
    assert!(second.is_empty());
    assert_eq!(state.status().notified_orders_count, 1);
}

#[test]
fn notified_order_blocks_even_with_a_new_fingerprint() {
    init_logging();
    let state = CoordinatorState::new();
    let (state, _) = update(state, order_found("Venda #1234", "42", 7));
    // Page re-rendered: same order, different surrounding content.
    let (_, effects) = update(state, order_found("Venda #1234", "43", 7));
    assert!(effects.is_empty());
}

#[test]
fn notified_order_blocks_across_tabs() {
    init_logging();
    let state = CoordinatorState::new();
    let (state, _) = update(state, order_found("Venda #1234", "42", 7));
    let (_, effects) = update(state, order_found("Venda #1234", "42", 9));
    assert!(effects.is_empty());
}

#[test]
fn different_orders_notify_independently() {
    init_logging();
    let state = CoordinatorState::new();
    let (state, _) = update(state, order_found("Venda #1234", "42", 7));
    let (state, effects) = update(state, order_found("Pedido #77", "55", 7));
    assert_eq!(notification_count(&effects), 1);
    assert_eq!(
        state.log().orders,
        vec!["Venda #1234".to_string(), "Pedido #77".to_string()]
    );
}

#[test]
fn monitoring_off_drops_detections_silently() {
    init_logging();
    let state = CoordinatorState::new();
    let (state, _) = update(state, Msg::ToggleMonitoring);
    assert!(!state.is_monitoring());

    let (state, effects) = update(state, order_found("Venda #1234", "42", 7));
    assert!(effects.is_empty());
    assert_eq!(state.status().notified_orders_count, 0);
}

#[test]
fn toggle_clears_session_dedup_but_not_the_durable_log() {
    init_logging();
    let state = CoordinatorState::new();
    let (state, _) = update(state, order_found("Venda #1234", "42", 7));

    // Off, then on again: a new monitoring session.
    let (state, _) = update(state, Msg::ToggleMonitoring);
    let (state, effects) = update(state, Msg::ToggleMonitoring);
    assert!(state.is_monitoring());
    assert!(effects.iter().any(|effect| matches!(
        effect,
        Effect::BroadcastMonitoring { is_monitoring: true }
    )));

    // Already-notified order must stay suppressed by the durable set.
    let (state, effects) = update(state, order_found("Venda #1234", "42", 7));
    assert!(effects.is_empty());
    assert_eq!(state.status().notified_orders_count, 1);
}

#[test]
fn toggle_emits_persist_and_broadcast() {
    init_logging();
    let state = CoordinatorState::new();
    let (_, effects) = update(state, Msg::ToggleMonitoring);
    assert_eq!(
        effects,
        vec![
            Effect::PersistMonitoring {
                is_monitoring: false
            },
            Effect::BroadcastMonitoring {
                is_monitoring: false
            },
        ]
    );
}

#[test]
fn clear_log_resets_both_sets_and_persists_empty() {
    init_logging();
    let state = CoordinatorState::new();
    let (state, _) = update(state, order_found("Venda #1234", "42", 7));
    let (state, effects) = update(state, Msg::ClearLog);

    assert_eq!(
        effects,
        vec![Effect::PersistOrders { orders: Vec::new() }]
    );
    assert!(state.log().orders.is_empty());
    assert!(state.is_monitoring());

    // The same detection may notify again now.
    let (_, effects) = update(state, order_found("Venda #1234", "42", 7));
    assert_eq!(notification_count(&effects), 1);
}

#[test]
fn size_alert_is_informational_only() {
    init_logging();
    let state = CoordinatorState::new();
    let before = state.clone();
    let (state, effects) = update(
        state,
        Msg::SizeAlert {
            message: "Tamanho Feminino (40) > Masculino (38)".to_string(),
            female_size: 40,
            male_size: 38,
            tab_id: 7,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state, before);
}

#[test]
fn restore_seeds_monitoring_and_log() {
    init_logging();
    let state = CoordinatorState::new();
    let (state, effects) = update(
        state,
        Msg::RestoreState {
            is_monitoring: false,
            notified_orders: vec!["Venda #1234".to_string()],
        },
    );
    assert!(effects.is_empty());
    assert!(!state.is_monitoring());
    assert_eq!(state.log().orders, vec!["Venda #1234".to_string()]);

    // Restored orders still gate notifications once monitoring resumes.
    let (state, _) = update(state, Msg::ToggleMonitoring);
    let (_, effects) = update(state, order_found("Venda #1234", "42", 7));
    assert!(effects.is_empty());
}

#[test]
fn notification_effect_carries_the_order_identifier() {
    init_logging();
    let state = CoordinatorState::new();
    let (_, effects) = update(state, order_found("Venda #1234", "42", 7));
    let message = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::ShowNotification { message, .. } => Some(message.clone()),
            _ => None,
        })
        .expect("notification effect");
    assert!(message.contains("Venda #1234"));
}
