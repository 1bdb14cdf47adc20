//! Action-tagged wire contract between page watchers, the coordinator, and
//! the control surface. The in-process transport carries these types
//! directly; the serde shape is the cross-process contract.

use serde::{Deserialize, Serialize};

/// Requests into the coordinator. The originating tab id travels in the
/// transport envelope, not in the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    /// One-way, watcher to coordinator.
    #[serde(rename_all = "camelCase")]
    OrderFound {
        order_number: String,
        element_hash: String,
    },
    /// One-way, informational only.
    #[serde(rename_all = "camelCase")]
    SizeAlert {
        message: String,
        female_size: u32,
        male_size: u32,
    },
    GetStatus,
    ToggleMonitoring,
    GetLog,
    ClearLog,
}

/// Response to `getStatus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub is_monitoring: bool,
    pub notified_orders_count: usize,
}

/// Response to `toggleMonitoring`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub is_monitoring: bool,
}

/// Response to `getLog`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogResponse {
    pub orders: Vec<String>,
}

/// Response to `clearLog`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearResponse {
    pub success: bool,
}

/// One-way notices from the coordinator to a tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum TabNotice {
    /// Play the alert cue and show the in-page notice for `order_number`.
    #[serde(rename_all = "camelCase")]
    PlayAlert { order_number: String },
    /// Broadcast of the new monitoring flag.
    #[serde(rename_all = "camelCase")]
    MonitoringStatusChanged { is_monitoring: bool },
}
