//! Shared helpers for command handlers.

use std::path::{Path, PathBuf};

use onumon_core::config::{self, OnuOptions, OnuSettings, ResolvedConfig};
use onumon_core::keys::KeyStore;

use crate::error::CliError;

/// Resolves the configuration directory: explicit override or platform
/// default.
pub fn config_dir(cli_override: Option<&Path>) -> Result<PathBuf, CliError> {
    match cli_override {
        Some(dir) => Ok(dir.to_path_buf()),
        None => config::default_config_dir().map_err(|e| CliError::Config(e.to_string())),
    }
}

/// Path of the settings file inside a configuration directory.
pub fn settings_path(dir: &Path) -> PathBuf {
    dir.join("config.toml")
}

/// Loads stored settings and resolves them into a runtime configuration
/// plus the installation's key store.
pub fn load_context(
    cli_config: Option<&Path>,
    interval_override: Option<u32>,
) -> Result<(ResolvedConfig, KeyStore), CliError> {
    let dir = config_dir(cli_config)?;
    let settings = config::load_settings(&settings_path(&dir)).map_err(|e| match e {
        config::ConfigError::NotFound(_) => {
            CliError::Config("no device configured; run `onumon init` first".to_string())
        }
        other => CliError::Config(other.to_string()),
    })?;

    let keys = KeyStore::new(&dir, &settings.device_name);
    let options = OnuOptions {
        scan_interval_secs: interval_override,
    };
    let config = ResolvedConfig::resolve(&settings, &options, keys.key_path().to_path_buf())
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok((config, keys))
}

/// Stores settings for a new or reconfigured device.
pub fn store_settings(cli_config: Option<&Path>, settings: &OnuSettings) -> Result<PathBuf, CliError> {
    let dir = config_dir(cli_config)?;
    let path = settings_path(&dir);
    config::save_settings(&path, settings).map_err(|e| CliError::Config(e.to_string()))?;
    Ok(path)
}
