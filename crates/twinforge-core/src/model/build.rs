// ── Build domain type ──

use serde::{Deserialize, Serialize};

/// Lifecycle of the latest firmware compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildStatus {
    Idle,
    Compiling,
    Succeeded,
    Failed,
}

impl BuildStatus {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Compiling)
    }
}

/// The latest firmware build. A new compile replaces the record wholesale;
/// no history is retained here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Build {
    /// Server-issued id, set only when `status` is `Succeeded`.
    pub id: Option<String>,
    pub source_code: String,
    pub status: BuildStatus,
    pub logs: String,
}

impl Build {
    /// No compile issued yet.
    pub fn idle() -> Self {
        Self {
            id: None,
            source_code: String::new(),
            status: BuildStatus::Idle,
            logs: String::new(),
        }
    }

    /// A fresh in-flight compile of `source`.
    pub(crate) fn compiling(source: &str) -> Self {
        Self {
            id: None,
            source_code: source.to_owned(),
            status: BuildStatus::Compiling,
            logs: String::new(),
        }
    }

    /// The build id, if this build is eligible for OTA assignment
    /// (compile finished successfully and the server issued an id).
    pub fn assignable_id(&self) -> Option<&str> {
        match self.status {
            BuildStatus::Succeeded => self.id.as_deref(),
            _ => None,
        }
    }
}
