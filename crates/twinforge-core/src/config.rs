// ── Workbench configuration ──

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use twinforge_api::TlsMode;

/// Everything the [`Workbench`](crate::Workbench) needs to talk to a
/// backend and pace its background refresh.
#[derive(Debug, Clone)]
pub struct WorkbenchConfig {
    /// Backend base URL (e.g. `http://bench-pi.local:8000`).
    pub base_url: Url,

    /// The device this workbench session targets.
    pub device_id: String,

    /// Optional pre-issued session token.
    pub token: Option<SecretString>,

    pub tls: TlsMode,
    pub timeout: Duration,

    /// Cadence of the OTA event poll. Zero disables the poller.
    pub ota_poll_interval: Duration,

    /// Cadence of the device status + pin telemetry refresh.
    /// Zero disables the poller.
    pub status_poll_interval: Duration,
}

impl WorkbenchConfig {
    /// Config with the defaults a single-device lab bench wants.
    pub fn new(base_url: Url, device_id: impl Into<String>) -> Self {
        Self {
            base_url,
            device_id: device_id.into(),
            token: None,
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            ota_poll_interval: Duration::from_secs(2),
            status_poll_interval: Duration::from_secs(5),
        }
    }
}
