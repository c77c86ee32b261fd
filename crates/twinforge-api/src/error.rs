use thiserror::Error;

/// Top-level error type for the `twinforge-api` crate.
///
/// Covers every failure mode across the backend surfaces: local validation,
/// authentication, transport, and server-reported rejections.
/// `twinforge-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Local validation ────────────────────────────────────────────
    /// Firmware source was empty after trimming. No request was sent.
    #[error("No firmware code provided")]
    EmptyInput,

    // ── Authentication ──────────────────────────────────────────────
    /// The backend rejected the session token (or none was set).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Server-reported rejections ──────────────────────────────────
    /// The compiler ran and reported failure. `logs` carries its output.
    #[error("Compilation failed")]
    CompileRejected { logs: String },

    /// The OTA assignment request was rejected by the backend.
    #[error("OTA assignment rejected: {message}")]
    AssignRejected { message: String },

    /// Any other structured backend error (e.g. a 404 `{detail}` body).
    #[error("Backend error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }
}
