use std::io::{self, BufRead};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sentinela_core::{update, CoordinatorState, Msg, Scanner};
use sentinela_engine::{
    AlertSink, AlertSound, ContentSource, CoordinatorHandle, DesktopAlertSink, FetchSettings,
    FileSource, HttpSource, WatcherConfig, WatcherHandle,
};
use watch_logging::watch_info;

use super::{logging, persistence};
use crate::cli::CliArgs;

pub(crate) fn run(args: CliArgs) -> anyhow::Result<()> {
    logging::initialize(if args.verbose {
        logging::LogDestination::Both
    } else {
        logging::LogDestination::File
    });

    let persisted = persistence::load_state(&args.state_file);
    let (initial, _) = update(
        CoordinatorState::new(),
        Msg::RestoreState {
            is_monitoring: persisted.is_monitoring,
            notified_orders: persisted.notified_orders.clone(),
        },
    );

    let sink: Arc<dyn AlertSink> = Arc::new(DesktopAlertSink::detect());
    let store = persistence::RonStateStore::new(&args.state_file, persisted.clone());
    let coordinator = CoordinatorHandle::spawn(initial, sink, Box::new(store));

    let config = WatcherConfig {
        debounce: Duration::from_millis(args.debounce_ms),
        tick: Duration::from_secs(args.tick_secs),
    };
    let sound = AlertSound::new(args.alert_sound.clone());

    let mut watchers = Vec::with_capacity(args.pages.len());
    for (index, page) in args.pages.iter().enumerate() {
        let tab_id = index as u64 + 1;
        let source = build_source(page).with_context(|| format!("cannot watch {page}"))?;
        let watcher = WatcherHandle::spawn(
            tab_id,
            source,
            coordinator.client(tab_id),
            Scanner::default(),
            config.clone(),
            sound.clone(),
        );
        coordinator.register_tab(tab_id, watcher.notices());
        if persisted.is_monitoring {
            watcher.start();
        }
        watch_info!("tab {tab_id}: watching {page}");
        watchers.push(watcher);
    }

    console_loop(&coordinator, &watchers)
}

fn build_source(page: &str) -> anyhow::Result<Box<dyn ContentSource>> {
    if page.starts_with("http://") || page.starts_with("https://") {
        Ok(Box::new(HttpSource::new(page, FetchSettings::default())?))
    } else {
        Ok(Box::new(FileSource::new(page)))
    }
}

/// Line-oriented control console over the coordinator operations.
fn console_loop(
    coordinator: &CoordinatorHandle,
    watchers: &[WatcherHandle],
) -> anyhow::Result<()> {
    let control = coordinator.client(0);
    println!("commands: status | log | toggle | clear | quit");

    for line in io::stdin().lock().lines() {
        let line = line?;
        match line.trim() {
            "status" => {
                if let Some(status) = control.get_status() {
                    println!(
                        "monitoring: {}, notified orders: {}",
                        status.is_monitoring, status.notified_orders_count
                    );
                }
            }
            "log" => {
                if let Some(log) = control.get_log() {
                    if log.orders.is_empty() {
                        println!("no orders notified yet");
                    }
                    for order in log.orders {
                        println!("{order}");
                    }
                }
            }
            "toggle" => {
                if let Some(toggled) = control.toggle_monitoring() {
                    println!("monitoring: {}", toggled.is_monitoring);
                }
            }
            "clear" => {
                if control.clear_log().is_some_and(|reply| reply.success) {
                    println!("log cleared");
                }
            }
            "quit" | "exit" => break,
            "" => {}
            other => println!("unknown command: {other}"),
        }
    }

    for watcher in watchers {
        watcher.shutdown();
    }
    coordinator.shutdown();
    Ok(())
}
