use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread;

use sentinela_core::{
    update, ClearResponse, CoordinatorState, Effect, LogResponse, Msg, Request, StatusResponse,
    TabId, TabNotice, ToggleResponse,
};
use watch_logging::{watch_info, watch_warn};

use crate::alert::{AlertNotification, AlertSink};

/// Durable storage for the coordinator's persisted state. Implemented by the
/// platform layer; failures must be handled internally (logged), never
/// propagated into the event loop.
pub trait StateStore: Send {
    fn save_monitoring(&mut self, is_monitoring: bool);
    fn save_orders(&mut self, orders: &[String]);
}

/// Store that remembers nothing; used in tests alongside in-memory sinks.
pub struct NullStateStore;

impl StateStore for NullStateStore {
    fn save_monitoring(&mut self, _is_monitoring: bool) {}
    fn save_orders(&mut self, _orders: &[String]) {}
}

enum Envelope {
    Request {
        tab_id: TabId,
        request: Request,
        reply: Option<mpsc::Sender<ControlReply>>,
    },
    RegisterTab {
        tab_id: TabId,
        notices: mpsc::Sender<TabNotice>,
    },
    Shutdown,
}

enum ControlReply {
    Status(StatusResponse),
    Toggle(ToggleResponse),
    Log(LogResponse),
    Clear(ClearResponse),
}

/// Owner of the coordinator thread. All requests from every tab and from the
/// control surface are serialized in arrival order, which makes the
/// check-then-set inside the state machine atomic across tabs.
pub struct CoordinatorHandle {
    tx: mpsc::Sender<Envelope>,
}

/// Cloneable client bound to one tab id (watchers) or tab id 0 (the control
/// surface). One-way sends swallow delivery failures; request/response calls
/// return `None` when the coordinator is gone.
#[derive(Clone)]
pub struct CoordinatorClient {
    tab_id: TabId,
    tx: mpsc::Sender<Envelope>,
}

impl CoordinatorHandle {
    pub fn spawn(
        initial: CoordinatorState,
        sink: Arc<dyn AlertSink>,
        store: Box<dyn StateStore>,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || run_loop(initial, sink, store, rx));
        Self { tx }
    }

    pub fn client(&self, tab_id: TabId) -> CoordinatorClient {
        CoordinatorClient {
            tab_id,
            tx: self.tx.clone(),
        }
    }

    /// Registers the notice channel for a tab. Later registrations for the
    /// same tab replace earlier ones.
    pub fn register_tab(&self, tab_id: TabId, notices: mpsc::Sender<TabNotice>) {
        let _ = self.tx.send(Envelope::RegisterTab { tab_id, notices });
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(Envelope::Shutdown);
    }
}

impl CoordinatorClient {
    pub fn order_found(&self, order_number: impl Into<String>, element_hash: impl Into<String>) {
        self.send_one_way(Request::OrderFound {
            order_number: order_number.into(),
            element_hash: element_hash.into(),
        });
    }

    pub fn size_alert(&self, message: impl Into<String>, female_size: u32, male_size: u32) {
        self.send_one_way(Request::SizeAlert {
            message: message.into(),
            female_size,
            male_size,
        });
    }

    pub fn get_status(&self) -> Option<StatusResponse> {
        match self.request(Request::GetStatus)? {
            ControlReply::Status(status) => Some(status),
            _ => None,
        }
    }

    pub fn toggle_monitoring(&self) -> Option<ToggleResponse> {
        match self.request(Request::ToggleMonitoring)? {
            ControlReply::Toggle(toggle) => Some(toggle),
            _ => None,
        }
    }

    pub fn get_log(&self) -> Option<LogResponse> {
        match self.request(Request::GetLog)? {
            ControlReply::Log(log) => Some(log),
            _ => None,
        }
    }

    pub fn clear_log(&self) -> Option<ClearResponse> {
        match self.request(Request::ClearLog)? {
            ControlReply::Clear(clear) => Some(clear),
            _ => None,
        }
    }

    fn send_one_way(&self, request: Request) {
        let _ = self.tx.send(Envelope::Request {
            tab_id: self.tab_id,
            request,
            reply: None,
        });
    }

    fn request(&self, request: Request) -> Option<ControlReply> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(Envelope::Request {
                tab_id: self.tab_id,
                request,
                reply: Some(reply_tx),
            })
            .ok()?;
        reply_rx.recv().ok()
    }
}

fn run_loop(
    mut state: CoordinatorState,
    sink: Arc<dyn AlertSink>,
    mut store: Box<dyn StateStore>,
    rx: mpsc::Receiver<Envelope>,
) {
    let mut tabs: HashMap<TabId, mpsc::Sender<TabNotice>> = HashMap::new();

    while let Ok(envelope) = rx.recv() {
        match envelope {
            Envelope::Request {
                tab_id,
                request,
                reply,
            } => {
                let (next, effects, answer) = handle_request(state, tab_id, request);
                state = next;
                for effect in effects {
                    run_effect(effect, &sink, store.as_mut(), &mut tabs);
                }
                if let (Some(reply), Some(answer)) = (reply, answer) {
                    let _ = reply.send(answer);
                }
            }
            Envelope::RegisterTab { tab_id, notices } => {
                tabs.insert(tab_id, notices);
            }
            Envelope::Shutdown => break,
        }
    }
}

fn handle_request(
    state: CoordinatorState,
    tab_id: TabId,
    request: Request,
) -> (CoordinatorState, Vec<Effect>, Option<ControlReply>) {
    match request {
        Request::OrderFound {
            order_number,
            element_hash,
        } => {
            let (state, effects) = update(
                state,
                Msg::OrderFound {
                    order_number,
                    element_hash,
                    tab_id,
                },
            );
            (state, effects, None)
        }
        Request::SizeAlert {
            message,
            female_size,
            male_size,
        } => {
            watch_info!("size alert from tab {tab_id}: {message}");
            let (state, effects) = update(
                state,
                Msg::SizeAlert {
                    message,
                    female_size,
                    male_size,
                    tab_id,
                },
            );
            (state, effects, None)
        }
        Request::GetStatus => {
            let view = state.status();
            let reply = ControlReply::Status(StatusResponse {
                is_monitoring: view.is_monitoring,
                notified_orders_count: view.notified_orders_count,
            });
            (state, Vec::new(), Some(reply))
        }
        Request::ToggleMonitoring => {
            let (state, effects) = update(state, Msg::ToggleMonitoring);
            let reply = ControlReply::Toggle(ToggleResponse {
                is_monitoring: state.is_monitoring(),
            });
            (state, effects, Some(reply))
        }
        Request::GetLog => {
            let reply = ControlReply::Log(LogResponse {
                orders: state.log().orders,
            });
            (state, Vec::new(), Some(reply))
        }
        Request::ClearLog => {
            let (state, effects) = update(state, Msg::ClearLog);
            (state, effects, Some(ControlReply::Clear(ClearResponse { success: true })))
        }
    }
}

fn run_effect(
    effect: Effect,
    sink: &Arc<dyn AlertSink>,
    store: &mut dyn StateStore,
    tabs: &mut HashMap<TabId, mpsc::Sender<TabNotice>>,
) {
    match effect {
        Effect::PersistMonitoring { is_monitoring } => store.save_monitoring(is_monitoring),
        Effect::PersistOrders { orders } => store.save_orders(&orders),
        Effect::ShowNotification {
            title,
            message,
            order_number,
            dismiss_after,
        } => {
            let notification = AlertNotification::new(title, message);
            let shown = match sink.show(&notification) {
                Ok(()) => Some(notification),
                Err(err) => {
                    watch_warn!("rich notification failed, falling back: {err}");
                    let fallback =
                        AlertNotification::new("Sentinela", format!("Nova venda: {order_number}"));
                    match sink.show(&fallback) {
                        Ok(()) => Some(fallback),
                        Err(err) => {
                            watch_warn!("fallback notification failed: {err}");
                            None
                        }
                    }
                }
            };
            if let Some(notification) = shown {
                watch_info!("venda detectada: {order_number}");
                let sink = Arc::clone(sink);
                thread::spawn(move || {
                    thread::sleep(dismiss_after);
                    sink.dismiss(&notification.id);
                });
            }
        }
        Effect::PlayTabAlert {
            tab_id,
            order_number,
        } => {
            let notice = TabNotice::PlayAlert { order_number };
            deliver(tabs, tab_id, notice);
        }
        Effect::BroadcastMonitoring { is_monitoring } => {
            let tab_ids: Vec<TabId> = tabs.keys().copied().collect();
            for tab_id in tab_ids {
                deliver(
                    tabs,
                    tab_id,
                    TabNotice::MonitoringStatusChanged { is_monitoring },
                );
            }
        }
    }
}

/// Best-effort tab delivery; an unreachable tab is logged and dropped from
/// the registry.
fn deliver(tabs: &mut HashMap<TabId, mpsc::Sender<TabNotice>>, tab_id: TabId, notice: TabNotice) {
    let reachable = match tabs.get(&tab_id) {
        Some(tx) => tx.send(notice).is_ok(),
        None => {
            watch_warn!("no registered channel for tab {tab_id}");
            return;
        }
    };
    if !reachable {
        watch_warn!("tab {tab_id} unreachable, dropping");
        tabs.remove(&tab_id);
    }
}
