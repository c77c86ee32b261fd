//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use twinforge_core::CoreError;

/// Exit codes per the CLI conventions.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const BUILD: i32 = 5;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the workbench backend at {url}")]
    #[diagnostic(
        code(twinforge::connection_failed),
        help(
            "Check that the backend is running and accessible.\n\
             URL: {url}\n\
             Try: twinforge ping"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(twinforge::auth_failed),
        help("Set TWINFORGE_TOKEN or configure `token` in the config file.")
    )]
    AuthFailed { message: String },

    // ── Workflow ─────────────────────────────────────────────────────

    #[error("Compilation failed")]
    #[diagnostic(code(twinforge::compile_failed))]
    CompileFailed {
        #[help]
        logs: Option<String>,
    },

    #[error("OTA assignment failed: {reason}")]
    #[diagnostic(
        code(twinforge::assignment_failed),
        help("The backend accepted no delivery for this build. Re-run `twinforge deploy` to retry.")
    )]
    AssignmentFailed { reason: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("Device '{identifier}' not found")]
    #[diagnostic(
        code(twinforge::not_found),
        help("Check --device / TWINFORGE_DEVICE against the backend's device list.")
    )]
    DeviceNotFound { identifier: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(twinforge::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("No backend configured")]
    #[diagnostic(
        code(twinforge::no_backend),
        help(
            "Pass --backend, set TWINFORGE_BACKEND, or put `backend = \"http://...\"`\n\
             in the config file at: {path}"
        )
    )]
    NoBackend { path: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("Backend error: {message}")]
    #[diagnostic(code(twinforge::api_error))]
    ApiError { message: String },

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::DeviceNotFound { .. } => exit_code::NOT_FOUND,
            Self::CompileFailed { .. } | Self::AssignmentFailed { .. } => exit_code::BUILD,
            Self::Validation { .. } | Self::NoBackend { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EmptyInput => CliError::Validation {
                field: "source".into(),
                reason: "no firmware code provided".into(),
            },

            CoreError::NoBuildAvailable => CliError::Validation {
                field: "build".into(),
                reason: "no successful build available; compile firmware first".into(),
            },

            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::DeviceNotFound { identifier } => CliError::DeviceNotFound { identifier },

            CoreError::Api { message, status: _ } => CliError::ApiError { message },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::ApiError { message },
        }
    }
}

impl From<twinforge_api::Error> for CliError {
    fn from(err: twinforge_api::Error) -> Self {
        CoreError::from(err).into()
    }
}
