//! CLI-side configuration assembly.
//!
//! Loads the shared config file, applies `GlobalOpts` overrides, and
//! produces the `WorkbenchConfig` the core consumes.

use secrecy::SecretString;

use twinforge_config::ConfigError;
use twinforge_core::WorkbenchConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Build a `WorkbenchConfig` from the config file plus CLI flag overrides.
pub fn build_workbench_config(global: &GlobalOpts) -> Result<WorkbenchConfig, CliError> {
    let mut cfg = twinforge_config::load_config_or_default();

    if let Some(ref backend) = global.backend {
        cfg.backend = Some(backend.clone());
    }
    if let Some(ref device) = global.device {
        cfg.device = device.clone();
    }
    if global.insecure {
        cfg.insecure = true;
    }
    cfg.timeout = global.timeout;

    let mut workbench_config =
        twinforge_config::to_workbench_config(&cfg).map_err(|err| match err {
            ConfigError::NoBackend => CliError::NoBackend {
                path: twinforge_config::config_path().display().to_string(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Validation {
                field: "config".into(),
                reason: other.to_string(),
            },
        })?;

    if let Some(ref token) = global.token {
        workbench_config.token = Some(SecretString::from(token.clone()));
    }

    Ok(workbench_config)
}
