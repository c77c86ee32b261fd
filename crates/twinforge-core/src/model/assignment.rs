// ── OTA assignment domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of an OTA assignment request.
///
/// `Assigned` means the server accepted the request. Whether the device
/// actually installed the build is reported separately through the OTA
/// event feed; the two are deliberately never merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentStatus {
    Requested,
    Assigned,
    Failed,
}

/// A request to deliver a build to a device. A later assignment for the
/// same device supersedes this record entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtaAssignment {
    pub device_id: String,
    pub build_id: String,
    pub status: AssignmentStatus,
    pub reason: Option<String>,
    pub requested_at: DateTime<Utc>,
}

impl OtaAssignment {
    pub(crate) fn requested(device_id: &str, build_id: &str) -> Self {
        Self {
            device_id: device_id.to_owned(),
            build_id: build_id.to_owned(),
            status: AssignmentStatus::Requested,
            reason: None,
            requested_at: Utc::now(),
        }
    }
}
