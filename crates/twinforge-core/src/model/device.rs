// ── Device domain type ──

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use twinforge_api::models::DeviceStatusResponse;

/// The tracked hardware device.
///
/// Created once at startup with offline defaults and mutated only by
/// status-fetch results. There is exactly one instance per known device id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub online: bool,
    pub last_seen: Option<DateTime<Utc>>,
    pub network_confirmed: bool,
}

impl Device {
    /// A device we have not heard from yet.
    pub fn unknown(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            online: false,
            last_seen: None,
            network_confirmed: false,
        }
    }

    /// Fold a status-fetch result into this record.
    pub(crate) fn apply_status(&mut self, status: &DeviceStatusResponse) {
        self.online = status.online;
        self.network_confirmed = status.wifi_confirmed;
        if let Some(raw) = status.last_seen.as_deref() {
            if let Some(ts) = parse_last_seen(raw) {
                self.last_seen = Some(ts);
            }
        }
    }
}

/// Parse the backend's `last_seen` string.
///
/// The backend emits naive datetimes (no offset); proxied deployments
/// rewrite them to RFC 3339. Accept both, treating naive values as UTC.
pub(crate) fn parse_last_seen(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_last_seen() {
        let ts = parse_last_seen("2024-06-15T10:30:00Z").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-06-15T10:30:00+00:00");
    }

    #[test]
    fn parses_naive_last_seen_as_utc() {
        let ts = parse_last_seen("2024-06-15T10:30:00.123456").unwrap();
        assert_eq!(ts.timestamp(), 1_718_447_400);
    }

    #[test]
    fn keeps_previous_last_seen_on_unparseable_input() {
        let mut device = Device::unknown("esp32_01");
        device.apply_status(&DeviceStatusResponse {
            online: true,
            wifi_confirmed: false,
            last_seen: Some("2024-06-15T10:30:00Z".into()),
        });
        let first = device.last_seen.unwrap();

        device.apply_status(&DeviceStatusResponse {
            online: false,
            wifi_confirmed: true,
            last_seen: Some("garbage".into()),
        });

        assert_eq!(device.last_seen, Some(first));
        assert!(!device.online);
        assert!(device.network_confirmed);
    }
}
