// ── Core error types ──
//
// User-facing errors from twinforge-core. These are NOT API-specific --
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<twinforge_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.
//
// Compile and assignment failures from the network are NOT represented
// here: they are folded into the Build/Assignment status fields and never
// thrown past the Workbench boundary.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Guard failures (synchronous, no network touched) ─────────────
    #[error("No firmware code provided")]
    EmptyInput,

    #[error("No successful build available to assign; compile firmware first")]
    NoBuildAvailable,

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("Backend error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<twinforge_api::Error> for CoreError {
    fn from(err: twinforge_api::Error) -> Self {
        match err {
            twinforge_api::Error::EmptyInput => CoreError::EmptyInput,
            twinforge_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            twinforge_api::Error::Transport(ref e) => {
                if e.is_connect() || e.is_timeout() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            twinforge_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            twinforge_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            // These two are normally absorbed into entity status by the
            // Workbench; the mapping exists for direct client callers.
            twinforge_api::Error::CompileRejected { logs } => CoreError::Api {
                message: logs,
                status: None,
            },
            twinforge_api::Error::AssignRejected { message } => CoreError::Api {
                message,
                status: None,
            },
            twinforge_api::Error::Api { status, message } => {
                if status == 404 && message.contains("Device") {
                    CoreError::DeviceNotFound {
                        identifier: message,
                    }
                } else {
                    CoreError::Api {
                        message,
                        status: Some(status),
                    }
                }
            }
            twinforge_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
