//! Shared configuration for the twinforge CLI.
//!
//! TOML config file, `TWINFORGE_`-prefixed environment overrides, token
//! resolution, and translation to `twinforge_core::WorkbenchConfig`.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use twinforge_api::TlsMode;
use twinforge_core::WorkbenchConfig;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no backend URL configured (set `backend` in the config file or TWINFORGE_BACKEND)")]
    NoBackend,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config struct ──────────────────────────────────────────────

/// Top-level TOML configuration. One backend, one device: a workbench
/// session targets a single board, so there is no profile map.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Backend base URL (e.g. "http://bench-pi.local:8000").
    pub backend: Option<String>,

    /// Target device id.
    #[serde(default = "default_device")]
    pub device: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Accept self-signed TLS certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// OTA event poll cadence in seconds (0 disables).
    #[serde(default = "default_ota_poll")]
    pub ota_poll_secs: u64,

    /// Device status / telemetry poll cadence in seconds (0 disables).
    #[serde(default = "default_status_poll")]
    pub status_poll_secs: u64,

    /// Session token (plaintext; prefer `token_env`).
    pub token: Option<String>,

    /// Environment variable name containing the session token.
    pub token_env: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: None,
            device: default_device(),
            timeout: default_timeout(),
            insecure: false,
            ca_cert: None,
            ota_poll_secs: default_ota_poll(),
            status_poll_secs: default_status_poll(),
            token: None,
            token_env: None,
        }
    }
}

fn default_device() -> String {
    "esp32_01".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_ota_poll() -> u64 {
    2
}
fn default_status_poll() -> u64 {
    5
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "twinforge", "twinforge").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("twinforge");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the Config from an explicit file path + environment.
pub fn load_config_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("TWINFORGE_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Token resolution ────────────────────────────────────────────────

/// Resolve the session token: named env var first, then plaintext config.
pub fn resolve_token(config: &Config) -> Option<SecretString> {
    if let Some(ref env_name) = config.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    config
        .token
        .as_ref()
        .map(|token| SecretString::from(token.clone()))
}

// ── Translation to WorkbenchConfig ──────────────────────────────────

/// Build a `WorkbenchConfig` from the loaded config.
pub fn to_workbench_config(config: &Config) -> Result<WorkbenchConfig, ConfigError> {
    let backend = config.backend.as_deref().ok_or(ConfigError::NoBackend)?;
    let base_url: url::Url = backend.parse().map_err(|_| ConfigError::Validation {
        field: "backend".into(),
        reason: format!("invalid URL: {backend}"),
    })?;

    let tls = if config.insecure {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = config.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let mut wb = WorkbenchConfig::new(base_url, config.device.clone());
    wb.token = resolve_token(config);
    wb.tls = tls;
    wb.timeout = Duration::from_secs(config.timeout);
    wb.ota_poll_interval = Duration::from_secs(config.ota_poll_secs);
    wb.status_poll_interval = Duration::from_secs(config.status_poll_secs);
    Ok(wb)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();
        assert_eq!(config.device, "esp32_01");
        assert_eq!(config.ota_poll_secs, 2);
        assert_eq!(config.status_poll_secs, 5);
        assert!(config.backend.is_none());
    }

    #[test]
    fn loads_toml_file_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "backend = \"http://bench-pi.local:8000\"\ndevice = \"esp32_02\"\nota_poll_secs = 10"
        )
        .unwrap();

        let config = load_config_from(file.path()).unwrap();
        assert_eq!(config.backend.as_deref(), Some("http://bench-pi.local:8000"));
        assert_eq!(config.device, "esp32_02");
        assert_eq!(config.ota_poll_secs, 10);
        // Untouched keys keep their defaults.
        assert_eq!(config.timeout, 30);
    }

    #[test]
    fn workbench_config_requires_backend() {
        let config = Config::default();
        assert!(matches!(
            to_workbench_config(&config),
            Err(ConfigError::NoBackend)
        ));
    }

    #[test]
    fn workbench_config_rejects_bad_url() {
        let config = Config {
            backend: Some("not a url".into()),
            ..Config::default()
        };
        assert!(matches!(
            to_workbench_config(&config),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn workbench_config_carries_intervals() {
        let config = Config {
            backend: Some("http://localhost:8000".into()),
            ota_poll_secs: 0,
            status_poll_secs: 7,
            ..Config::default()
        };

        let wb = to_workbench_config(&config).unwrap();
        assert!(wb.ota_poll_interval.is_zero());
        assert_eq!(wb.status_poll_interval, Duration::from_secs(7));
        assert_eq!(wb.device_id, "esp32_01");
    }

    #[test]
    fn plaintext_token_resolves() {
        let config = Config {
            token: Some("mock-token".into()),
            ..Config::default()
        };
        assert!(resolve_token(&config).is_some());
    }
}
