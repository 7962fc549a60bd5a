//! Device setup command.

use std::path::Path;

use onumon_core::config::{OnuOptions, OnuSettings, ResolvedConfig};
use onumon_core::keys::KeyStore;

use crate::error::CliError;
use crate::util;

/// Parameters for device setup
pub struct InitParams<'a> {
    /// Device host address
    pub host: &'a str,
    /// SSH username
    pub user: &'a str,
    /// Poll interval in seconds, if overriding the default
    pub interval: Option<u32>,
    /// Manufacturer label, if overriding the default
    pub manufacturer: Option<&'a str>,
    /// Display name, if overriding the default
    pub name: Option<&'a str>,
}

/// Init command handler: store settings and generate the key pair.
pub async fn cmd_init(config_path: Option<&Path>, params: InitParams<'_>) -> Result<(), CliError> {
    let mut settings = OnuSettings {
        host: params.host.to_string(),
        username: params.user.to_string(),
        device_manufacturer: "Unknown".to_string(),
        device_name: "XGSPON ONU Stick".to_string(),
        scan_interval_secs: params.interval,
    };
    if let Some(manufacturer) = params.manufacturer {
        settings.device_manufacturer = manufacturer.to_string();
    }
    if let Some(name) = params.name {
        settings.device_name = name.to_string();
    }

    // Validate before persisting anything
    let dir = util::config_dir(config_path)?;
    let keys = KeyStore::new(&dir, &settings.device_name);
    ResolvedConfig::resolve(
        &settings,
        &OnuOptions::default(),
        keys.key_path().to_path_buf(),
    )
    .map_err(|e| CliError::Config(e.to_string()))?;

    let path = util::store_settings(config_path, &settings)?;
    let pair = keys.ensure().await.map_err(|e| CliError::Key(e.to_string()))?;

    println!("Settings written to {}", path.display());
    println!("\nInstall this public key on the device (append to /etc/dropbear/authorized_keys):\n");
    println!("{}", pair.public_key);
    Ok(())
}
