// ── OTA event domain types ──
//
// Server-observed delivery/fallback outcomes. Immutable once observed;
// the core keeps an append-only sequence deduplicated by
// (device_id, build_id, timestamp).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use twinforge_api::models::OtaEventRecord;

/// Device-side outcome reported by the server.
///
/// The vocabulary is open-ended: unrecognized statuses are preserved
/// verbatim rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtaEventStatus {
    /// The device fetched and booted the assigned build.
    Delivered,
    /// The device rejected or reverted the assigned build.
    Fallback,
    Other(String),
}

impl OtaEventStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "delivered" => Self::Delivered,
            "fallback" => Self::Fallback,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Delivered => "delivered",
            Self::Fallback => "fallback",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for OtaEventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OtaEventStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One observed OTA outcome.
#[derive(Debug, Clone, Serialize)]
pub struct OtaEvent {
    pub timestamp: DateTime<Utc>,
    pub device_id: String,
    pub build_id: String,
    pub status: OtaEventStatus,
    pub reason: Option<String>,
}

impl OtaEvent {
    /// The dedup identity of this event.
    pub(crate) fn key(&self) -> EventKey {
        EventKey {
            device_id: self.device_id.clone(),
            build_id: self.build_id.clone(),
            timestamp: self.timestamp,
        }
    }
}

impl From<OtaEventRecord> for OtaEvent {
    fn from(record: OtaEventRecord) -> Self {
        Self {
            timestamp: record.timestamp,
            device_id: record.device_id,
            build_id: record.build_id,
            status: OtaEventStatus::parse(&record.status),
            reason: record.reason,
        }
    }
}

/// Identity under which observed events are deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct EventKey {
    device_id: String,
    build_id: String,
    timestamp: DateTime<Utc>,
}
