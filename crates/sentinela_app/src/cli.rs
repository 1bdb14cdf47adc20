//! CLI argument definitions for the sentinela binary.

use clap::Parser;
use std::path::PathBuf;

/// Sentinela - watches merchant pages for order and quantity patterns and
/// raises alerts.
#[derive(Parser, Debug)]
#[command(name = "sentinela", version, about)]
pub struct CliArgs {
    /// HTML files or http(s) URLs to watch; each becomes one tab.
    #[arg(required = true)]
    pub pages: Vec<String>,

    /// Path of the RON state file.
    #[arg(long = "state-file", default_value = ".sentinela_state.ron")]
    pub state_file: PathBuf,

    /// Trailing debounce for change-triggered rescans, in milliseconds.
    #[arg(long = "debounce-ms", default_value_t = 500)]
    pub debounce_ms: u64,

    /// Periodic fallback rescan interval, in seconds.
    #[arg(long = "tick-secs", default_value_t = 5)]
    pub tick_secs: u64,

    /// Audio file played when an alert fires.
    #[arg(long = "alert-sound")]
    pub alert_sound: Option<PathBuf>,

    /// Log to the terminal as well as sentinela.log.
    #[arg(long)]
    pub verbose: bool,
}
