use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use sentinela_core::{Scanner, TabId, TabNotice};
use watch_logging::{watch_debug, watch_info, watch_warn};

use crate::alert::AlertSound;
use crate::coordinator::CoordinatorClient;
use crate::highlight::{Banner, HighlightLayer};
use crate::page::PageParser;
use crate::source::{bridge_changes, ContentSource};
use crate::types::WatcherConfig;

enum WatcherEvent {
    Start,
    Stop,
    Probe(mpsc::Sender<WatcherProbe>),
    Shutdown,
    SourceChanged,
    Notice(TabNotice),
}

/// Observable snapshot of a watcher loop, for the control surface and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherProbe {
    pub running: bool,
    pub scan_count: u64,
    pub banner_cases: Vec<String>,
    pub marked_elements: Vec<u32>,
    pub wrapped_elements: Vec<u32>,
    pub last_alert: Option<String>,
}

/// Handle to one tab's watcher thread.
pub struct WatcherHandle {
    tab_id: TabId,
    tx: mpsc::Sender<WatcherEvent>,
    notices: mpsc::Sender<TabNotice>,
}

impl WatcherHandle {
    /// Spawns the watcher loop for `tab_id`. The loop starts stopped; call
    /// [`WatcherHandle::start`] (or deliver a `monitoringStatusChanged`
    /// notice) to begin scanning.
    pub fn spawn(
        tab_id: TabId,
        mut source: Box<dyn ContentSource>,
        client: CoordinatorClient,
        scanner: Scanner,
        config: WatcherConfig,
        sound: AlertSound,
    ) -> Self {
        let (tx, rx) = mpsc::channel();

        // Change subscription, bridged into the loop channel.
        let (change_tx, change_rx) = mpsc::channel();
        if let Err(err) = source.watch(change_tx) {
            watch_warn!("tab {tab_id}: change subscription unavailable: {err}");
        }
        bridge_changes(change_rx, tx.clone(), || WatcherEvent::SourceChanged);

        // Notice channel for the coordinator, bridged the same way.
        let (notice_tx, notice_rx) = mpsc::channel::<TabNotice>();
        {
            let tx = tx.clone();
            thread::spawn(move || {
                while let Ok(notice) = notice_rx.recv() {
                    if tx.send(WatcherEvent::Notice(notice)).is_err() {
                        break;
                    }
                }
            });
        }

        thread::spawn(move || {
            let mut watcher = WatcherLoop::new(tab_id, source, client, scanner, config, sound);
            watcher.run(rx);
        });

        Self {
            tab_id,
            tx,
            notices: notice_tx,
        }
    }

    pub fn tab_id(&self) -> TabId {
        self.tab_id
    }

    /// Sender the coordinator registers to reach this tab.
    pub fn notices(&self) -> mpsc::Sender<TabNotice> {
        self.notices.clone()
    }

    pub fn start(&self) {
        let _ = self.tx.send(WatcherEvent::Start);
    }

    pub fn stop(&self) {
        let _ = self.tx.send(WatcherEvent::Stop);
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(WatcherEvent::Shutdown);
    }

    pub fn probe(&self) -> Option<WatcherProbe> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx.send(WatcherEvent::Probe(reply_tx)).ok()?;
        reply_rx.recv().ok()
    }
}

struct WatcherLoop {
    tab_id: TabId,
    source: Box<dyn ContentSource>,
    client: CoordinatorClient,
    scanner: Scanner,
    parser: PageParser,
    config: WatcherConfig,
    sound: AlertSound,

    running: bool,
    scan_count: u64,
    /// Full page text of the previous scan; the rescan short-circuit.
    last_text: Option<String>,
    layer: HighlightLayer,
    banner: Banner,
    last_alert: Option<String>,

    /// Trailing-debounce deadline armed by change notifications.
    pending_scan: Option<Instant>,
    next_tick: Instant,
}

impl WatcherLoop {
    fn new(
        tab_id: TabId,
        source: Box<dyn ContentSource>,
        client: CoordinatorClient,
        scanner: Scanner,
        config: WatcherConfig,
        sound: AlertSound,
    ) -> Self {
        Self {
            tab_id,
            source,
            client,
            scanner,
            parser: PageParser::new(),
            config,
            sound,
            running: false,
            scan_count: 0,
            last_text: None,
            layer: HighlightLayer::new(),
            banner: Banner::new(),
            last_alert: None,
            pending_scan: None,
            next_tick: Instant::now(),
        }
    }

    fn run(&mut self, rx: mpsc::Receiver<WatcherEvent>) {
        loop {
            let event = if self.running {
                let wait = self
                    .next_deadline()
                    .saturating_duration_since(Instant::now());
                match rx.recv_timeout(wait) {
                    Ok(event) => Some(event),
                    Err(mpsc::RecvTimeoutError::Timeout) => None,
                    Err(mpsc::RecvTimeoutError::Disconnected) => break,
                }
            } else {
                // Stopped: no timers, just wait for control traffic.
                match rx.recv() {
                    Ok(event) => Some(event),
                    Err(_) => break,
                }
            };

            match event {
                Some(WatcherEvent::Start) => self.start(),
                Some(WatcherEvent::Stop) => self.stop(),
                Some(WatcherEvent::Probe(reply)) => {
                    let _ = reply.send(self.probe());
                }
                Some(WatcherEvent::Shutdown) => break,
                Some(WatcherEvent::SourceChanged) => {
                    if self.running {
                        self.pending_scan = Some(Instant::now() + self.config.debounce);
                    }
                }
                Some(WatcherEvent::Notice(notice)) => self.handle_notice(notice),
                None => self.fire_timers(),
            }
        }
    }

    fn next_deadline(&self) -> Instant {
        match self.pending_scan {
            Some(deadline) if deadline < self.next_tick => deadline,
            _ => self.next_tick,
        }
    }

    fn fire_timers(&mut self) {
        let now = Instant::now();
        if self.pending_scan.is_some_and(|deadline| deadline <= now) {
            self.pending_scan = None;
            self.scan();
        }
        if self.next_tick <= Instant::now() {
            self.scan();
            self.next_tick = Instant::now() + self.config.tick;
        }
    }

    /// Idempotent start: an already-running watcher is fully torn down
    /// first, then restarted with an immediate scan.
    fn start(&mut self) {
        if self.running {
            self.stop();
        }
        watch_info!("tab {}: monitoramento iniciado", self.tab_id);
        self.running = true;
        self.next_tick = Instant::now() + self.config.tick;
        self.scan();
    }

    fn stop(&mut self) {
        if self.running {
            watch_info!("tab {}: monitoramento parado", self.tab_id);
        }
        self.running = false;
        self.pending_scan = None;
        self.last_text = None;
        self.layer.reset();
        self.banner.remove();
    }

    fn handle_notice(&mut self, notice: TabNotice) {
        match notice {
            TabNotice::PlayAlert { order_number } => {
                watch_info!("tab {}: alerta para {order_number}", self.tab_id);
                self.sound.play();
                self.last_alert = Some(order_number);
            }
            TabNotice::MonitoringStatusChanged { is_monitoring } => {
                if is_monitoring {
                    self.start();
                } else {
                    self.stop();
                }
            }
        }
    }

    /// One scan cycle. Runs on the loop thread, so cycles never overlap;
    /// change notifications arriving meanwhile collapse into a single
    /// debounce deadline handled afterwards.
    fn scan(&mut self) {
        if !self.running {
            return;
        }
        self.scan_count += 1;
        watch_logging::set_scan_cycle(self.scan_count);

        let html = match self.source.fetch() {
            Ok(html) => html,
            Err(err) => {
                watch_warn!("tab {}: scan cycle failed: {err}", self.tab_id);
                return;
            }
        };

        let url = self.source.url().to_string();
        let page = self.parser.parse(self.tab_id, &url, &html);
        let text_changed = self.last_text.as_deref() != Some(page.text.as_str());
        let outcome = self.scanner.scan(&page, text_changed);
        self.last_text = Some(page.text.clone());

        // Reverse the previous pass, then reapply against the fresh page.
        self.layer.apply(&page, &outcome.highlights);
        self.banner.refresh(outcome.banner_cases());

        for event in &outcome.events {
            watch_debug!(
                "tab {}: order {} hash {}",
                self.tab_id,
                event.order_identifier,
                event.content_fingerprint
            );
            self.client
                .order_found(&event.order_identifier, &event.content_fingerprint);
        }
        for alert in &outcome.size_alerts {
            self.client
                .size_alert(&alert.message, alert.female_size, alert.male_size);
        }
    }

    fn probe(&self) -> WatcherProbe {
        WatcherProbe {
            running: self.running,
            scan_count: self.scan_count,
            banner_cases: self.banner.cases().to_vec(),
            marked_elements: self.layer.marked_elements(),
            wrapped_elements: self.layer.wrapped_elements(),
            last_alert: self.last_alert.clone(),
        }
    }
}
