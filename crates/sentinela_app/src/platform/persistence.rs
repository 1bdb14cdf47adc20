use std::fs;
use std::path::{Path, PathBuf};

use sentinela_engine::{AtomicFileWriter, StateStore};
use serde::{Deserialize, Serialize};
use watch_logging::{watch_error, watch_info, watch_warn};

const DEFAULT_STATE_FILENAME: &str = ".sentinela_state.ron";

/// The durable coordinator state: the monitoring flag and the serialized
/// notified-order set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PersistedState {
    pub is_monitoring: bool,
    pub notified_orders: Vec<String>,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            is_monitoring: true,
            notified_orders: Vec::new(),
        }
    }
}

/// Loads persisted state, tolerating a missing or unreadable file.
pub(crate) fn load_state(path: &Path) -> PersistedState {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return PersistedState::default();
        }
        Err(err) => {
            watch_warn!("Failed to read persisted state from {:?}: {}", path, err);
            return PersistedState::default();
        }
    };

    match ron::from_str(&content) {
        Ok(state) => {
            watch_info!("Loaded persisted state from {:?}", path);
            state
        }
        Err(err) => {
            watch_warn!("Failed to parse persisted state from {:?}: {}", path, err);
            PersistedState::default()
        }
    }
}

/// RON-backed store wired into the coordinator. Each mutation rewrites the
/// whole state file atomically; write failures are logged and the
/// coordinator keeps running on its in-memory state.
pub(crate) struct RonStateStore {
    dir: PathBuf,
    filename: String,
    state: PersistedState,
}

impl RonStateStore {
    pub(crate) fn new(path: &Path, initial: PersistedState) -> Self {
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(DEFAULT_STATE_FILENAME)
            .to_string();
        Self {
            dir,
            filename,
            state: initial,
        }
    }

    fn write(&self) {
        let pretty = ron::ser::PrettyConfig::new();
        let content = match ron::ser::to_string_pretty(&self.state, pretty) {
            Ok(text) => text,
            Err(err) => {
                watch_error!("Failed to serialize persisted state: {}", err);
                return;
            }
        };

        let writer = AtomicFileWriter::new(self.dir.clone());
        if let Err(err) = writer.write(&self.filename, &content) {
            watch_error!("Failed to write persisted state to {:?}: {}", self.dir, err);
        }
    }
}

impl StateStore for RonStateStore {
    fn save_monitoring(&mut self, is_monitoring: bool) {
        self.state.is_monitoring = is_monitoring;
        self.write();
    }

    fn save_orders(&mut self, orders: &[String]) {
        self.state.notified_orders = orders.to_vec();
        self.write();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let state = load_state(&dir.path().join("absent.ron"));
        assert!(state.is_monitoring);
        assert!(state.notified_orders.is_empty());
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_STATE_FILENAME);
        fs::write(&path, "not ron at all {{{").unwrap();
        let state = load_state(&path);
        assert!(state.is_monitoring);
        assert!(state.notified_orders.is_empty());
    }

    #[test]
    fn store_round_trips_through_ron() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_STATE_FILENAME);

        let mut store = RonStateStore::new(&path, PersistedState::default());
        store.save_orders(&["Venda #1234".to_string(), "Pedido #77".to_string()]);
        store.save_monitoring(false);

        let loaded = load_state(&path);
        assert!(!loaded.is_monitoring);
        assert_eq!(
            loaded.notified_orders,
            vec!["Venda #1234".to_string(), "Pedido #77".to_string()]
        );
    }

    #[test]
    fn clearing_orders_persists_an_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_STATE_FILENAME);

        let mut store = RonStateStore::new(&path, PersistedState::default());
        store.save_orders(&["Venda #1234".to_string()]);
        store.save_orders(&[]);

        let loaded = load_state(&path);
        assert!(loaded.notified_orders.is_empty());
    }
}
