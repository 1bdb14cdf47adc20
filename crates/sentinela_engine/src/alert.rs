use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use watch_logging::{watch_debug, watch_warn};

/// A desktop notification ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertNotification {
    /// `sentinela_<timestamp>_<random>`.
    pub id: String,
    pub title: String,
    pub message: String,
}

impl AlertNotification {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: notification_id(),
            title: title.into(),
            message: message.into(),
        }
    }
}

fn notification_id() -> String {
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("sentinela_{}_{}", Utc::now().timestamp_millis(), &random[..7])
}

#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("notification backend failed: {0}")]
    Backend(String),
    #[error("no notification backend available")]
    Unavailable,
}

/// External notification surface. Implementations must be cheap to call from
/// the coordinator thread and safe to share with the dismiss timers.
pub trait AlertSink: Send + Sync {
    fn show(&self, notification: &AlertNotification) -> Result<(), AlertError>;

    /// Best effort; backends without dismissal by id may no-op.
    fn dismiss(&self, id: &str);
}

/// Which platform notification command to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NotifyBackend {
    /// Linux: `notify-send` (libnotify).
    Linux,
    /// macOS: `osascript` into Notification Center.
    MacOs,
    /// No suitable backend; notifications are logged only.
    None,
}

impl NotifyBackend {
    fn detect() -> Self {
        if cfg!(target_os = "linux") {
            Self::Linux
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::None
        }
    }
}

/// Command-backed desktop notifications.
pub struct DesktopAlertSink {
    backend: NotifyBackend,
}

impl DesktopAlertSink {
    pub fn detect() -> Self {
        Self {
            backend: NotifyBackend::detect(),
        }
    }
}

impl AlertSink for DesktopAlertSink {
    fn show(&self, notification: &AlertNotification) -> Result<(), AlertError> {
        let status = match self.backend {
            NotifyBackend::Linux => Command::new("notify-send")
                .arg("--app-name")
                .arg("sentinela")
                .arg(&notification.title)
                .arg(&notification.message)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status(),
            NotifyBackend::MacOs => {
                let script = format!(
                    "display notification \"{}\" with title \"{}\"",
                    notification.message.replace('"', "\\\""),
                    notification.title.replace('"', "\\\"")
                );
                Command::new("osascript")
                    .arg("-e")
                    .arg(script)
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .status()
            }
            NotifyBackend::None => return Err(AlertError::Unavailable),
        };

        match status {
            Ok(code) if code.success() => Ok(()),
            Ok(code) => Err(AlertError::Backend(format!("exit {code}"))),
            Err(err) => Err(AlertError::Backend(err.to_string())),
        }
    }

    fn dismiss(&self, id: &str) {
        // Desktop servers expire notifications themselves; there is no
        // portable dismissal by id.
        watch_debug!("dismiss requested for {id}");
    }
}

/// Recording sink for tests. Optionally fails the first `failures` show
/// calls to exercise the minimal-notification fallback.
#[derive(Default)]
pub struct MemoryAlertSink {
    shown: Mutex<Vec<AlertNotification>>,
    dismissed: Mutex<Vec<String>>,
    failures: Mutex<usize>,
}

impl MemoryAlertSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_failures(failures: usize) -> Arc<Self> {
        let sink = Self::default();
        *sink.failures.lock().expect("lock failures") = failures;
        Arc::new(sink)
    }

    pub fn shown(&self) -> Vec<AlertNotification> {
        self.shown.lock().expect("lock shown").clone()
    }

    pub fn dismissed(&self) -> Vec<String> {
        self.dismissed.lock().expect("lock dismissed").clone()
    }
}

impl AlertSink for MemoryAlertSink {
    fn show(&self, notification: &AlertNotification) -> Result<(), AlertError> {
        let mut failures = self.failures.lock().expect("lock failures");
        if *failures > 0 {
            *failures -= 1;
            return Err(AlertError::Backend("injected failure".to_string()));
        }
        self.shown
            .lock()
            .expect("lock shown")
            .push(notification.clone());
        Ok(())
    }

    fn dismiss(&self, id: &str) {
        self.dismissed
            .lock()
            .expect("lock dismissed")
            .push(id.to_string());
    }
}

/// Command-backed audio cue played on `playAlert` notices. Best effort: a
/// missing player or media file downgrades to a log line.
#[derive(Debug, Clone, Default)]
pub struct AlertSound {
    media: Option<PathBuf>,
}

impl AlertSound {
    pub fn new(media: Option<PathBuf>) -> Self {
        Self { media }
    }

    /// No audio; used in tests.
    pub fn disabled() -> Self {
        Self { media: None }
    }

    pub fn play(&self) {
        let Some(media) = &self.media else {
            watch_debug!("alert sound: no media configured");
            return;
        };
        let player = if cfg!(target_os = "macos") {
            "afplay"
        } else {
            "aplay"
        };
        match Command::new(player)
            .arg(media)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(_) => {}
            Err(err) => watch_warn!("alert sound failed: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_ids_follow_the_pattern() {
        let id = notification_id();
        let mut parts = id.splitn(3, '_');
        assert_eq!(parts.next(), Some("sentinela"));
        let timestamp = parts.next().expect("timestamp part");
        assert!(timestamp.parse::<i64>().is_ok());
        let random = parts.next().expect("random part");
        assert_eq!(random.len(), 7);
    }

    #[test]
    fn notification_ids_are_unique() {
        let a = AlertNotification::new("t", "m");
        let b = AlertNotification::new("t", "m");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn memory_sink_injects_failures_then_recovers() {
        let sink = MemoryAlertSink::with_failures(1);
        let notification = AlertNotification::new("t", "m");
        assert!(sink.show(&notification).is_err());
        assert!(sink.show(&notification).is_ok());
        assert_eq!(sink.shown().len(), 1);
    }
}
