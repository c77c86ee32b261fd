// Wire types for the workbench backend.
//
// Field names follow the backend's snake_case JSON. Optional fields carry
// `#[serde(default)]` so older backends that omit them still parse.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// `GET /devices/{device_id}/status`
///
/// `last_seen` stays a raw string on the wire -- the backend emits naive
/// datetimes without an offset, which the core parses leniently.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceStatusResponse {
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub wifi_confirmed: bool,
    #[serde(default)]
    pub last_seen: Option<String>,
}

/// `GET /digital-twin/{device_id}`
///
/// `pins` maps pin ordinal to its reported logic level. Serde parses the
/// JSON object's string keys into `u8`.
#[derive(Debug, Clone, Deserialize)]
pub struct TwinSnapshotResponse {
    #[serde(default)]
    pub pins: HashMap<u8, i64>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// `POST /firmware/compile`
#[derive(Debug, Clone, Deserialize)]
pub struct CompileResponse {
    pub success: bool,
    #[serde(default)]
    pub build_id: Option<String>,
    #[serde(default)]
    pub logs: String,
}

/// `POST /ota/assign`
///
/// Current backends answer `{success, error?}`; older ones answer
/// `{"status": "assigned"}`. Both shapes are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl AssignResponse {
    /// Whether the backend accepted the assignment, under either shape.
    pub fn accepted(&self) -> bool {
        self.success || self.status.as_deref() == Some("assigned")
    }
}

/// One record from `GET /ota/events`. Timestamps are epoch seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct OtaEventRecord {
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    pub device_id: String,
    pub build_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// `POST /auth/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: String,
}

/// `POST /devices/{device_id}/confirm-network` and `GET /` both answer
/// with a bare status string.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusReply {
    #[serde(default)]
    pub status: String,
}
