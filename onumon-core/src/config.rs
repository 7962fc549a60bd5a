//! Configuration for one ONU installation
//!
//! Persisted settings live in a TOML file; post-setup overrides come in as
//! [`OnuOptions`]. Both are folded into a [`ResolvedConfig`] exactly once,
//! with documented precedence (explicit option > legacy stored value >
//! default), so the rest of the library never walks fallback chains.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default poll interval in seconds
pub const DEFAULT_SCAN_INTERVAL_SECS: u32 = 60;

/// Minimum configurable poll interval in seconds
pub const MIN_SCAN_INTERVAL_SECS: u32 = 30;

/// Maximum configurable poll interval in seconds
pub const MAX_SCAN_INTERVAL_SECS: u32 = 3600;

/// Errors raised while loading, validating or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Host field empty or missing
    #[error("device host must not be empty")]
    MissingHost,

    /// Username field empty or missing
    #[error("SSH username must not be empty")]
    MissingUsername,

    /// Poll interval outside the allowed range
    #[error(
        "scan interval {0}s outside allowed range \
         {MIN_SCAN_INTERVAL_SECS}-{MAX_SCAN_INTERVAL_SECS}s"
    )]
    IntervalOutOfRange(u32),

    /// No platform configuration directory available
    #[error("no configuration directory available on this platform")]
    NoConfigDir,

    /// Configuration file missing
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),

    /// IO failure while reading or writing
    #[error("configuration IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse failure
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize failure
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Persisted per-installation settings (stored as TOML).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnuSettings {
    /// Device host address
    pub host: String,
    /// SSH username
    pub username: String,
    /// Manufacturer shown in device metadata
    #[serde(default = "default_manufacturer")]
    pub device_manufacturer: String,
    /// Display name shown in device metadata
    #[serde(default = "default_device_name")]
    pub device_name: String,
    /// Legacy stored interval; superseded by [`OnuOptions`] when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_interval_secs: Option<u32>,
}

fn default_manufacturer() -> String {
    "Unknown".to_string()
}

fn default_device_name() -> String {
    "XGSPON ONU Stick".to_string()
}

/// Post-setup overrides, changeable without reconfiguring the device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnuOptions {
    /// Poll interval override in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_interval_secs: Option<u32>,
}

/// Fully resolved configuration for one installation.
///
/// Computed once at load time; nothing downstream consults settings or
/// options again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Device host address
    pub host: String,
    /// SSH username
    pub username: String,
    /// Manufacturer metadata
    pub device_manufacturer: String,
    /// Display name metadata
    pub device_name: String,
    /// Private key file path
    pub key_path: PathBuf,
    /// Effective poll interval in seconds
    pub poll_interval_secs: u32,
    /// Bound on establishing the SSH connection
    pub connect_timeout_secs: u64,
    /// Bound on executing the batched command
    pub exec_timeout_secs: u64,
}

impl ResolvedConfig {
    /// Resolves settings and options into one validated configuration.
    ///
    /// Interval precedence: explicit option > legacy stored value >
    /// [`DEFAULT_SCAN_INTERVAL_SECS`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when host or username are empty or the
    /// chosen interval falls outside the allowed range.
    pub fn resolve(
        settings: &OnuSettings,
        options: &OnuOptions,
        key_path: PathBuf,
    ) -> ConfigResult<Self> {
        if settings.host.trim().is_empty() {
            return Err(ConfigError::MissingHost);
        }
        if settings.username.trim().is_empty() {
            return Err(ConfigError::MissingUsername);
        }

        let interval = options
            .scan_interval_secs
            .or(settings.scan_interval_secs)
            .unwrap_or(DEFAULT_SCAN_INTERVAL_SECS);
        if !(MIN_SCAN_INTERVAL_SECS..=MAX_SCAN_INTERVAL_SECS).contains(&interval) {
            return Err(ConfigError::IntervalOutOfRange(interval));
        }

        Ok(Self {
            host: settings.host.trim().to_string(),
            username: settings.username.trim().to_string(),
            device_manufacturer: settings.device_manufacturer.clone(),
            device_name: settings.device_name.clone(),
            key_path,
            poll_interval_secs: interval,
            connect_timeout_secs: crate::session::DEFAULT_CONNECT_TIMEOUT_SECS,
            exec_timeout_secs: crate::session::DEFAULT_EXEC_TIMEOUT_SECS,
        })
    }
}

/// Clamps a runtime interval update into the allowed range.
#[must_use]
pub const fn clamp_interval(secs: u32) -> u32 {
    if secs < MIN_SCAN_INTERVAL_SECS {
        MIN_SCAN_INTERVAL_SECS
    } else if secs > MAX_SCAN_INTERVAL_SECS {
        MAX_SCAN_INTERVAL_SECS
    } else {
        secs
    }
}

/// Returns the default configuration directory (`<config>/onumon`).
///
/// # Errors
///
/// Returns [`ConfigError::NoConfigDir`] when the platform has no
/// configuration directory.
pub fn default_config_dir() -> ConfigResult<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("onumon"))
        .ok_or(ConfigError::NoConfigDir)
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] when the file is absent, or a parse
/// error when its contents are invalid.
pub fn load_settings(path: &Path) -> ConfigResult<OnuSettings> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&raw)?)
}

/// Saves settings to a TOML file, creating parent directories as needed.
///
/// # Errors
///
/// Returns a [`ConfigError`] on serialization or IO failure.
pub fn save_settings(path: &Path, settings: &OnuSettings) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let raw = toml::to_string_pretty(settings)?;
    std::fs::write(path, raw)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> OnuSettings {
        OnuSettings {
            host: "192.168.11.1".to_string(),
            username: "root".to_string(),
            device_manufacturer: "ACME".to_string(),
            device_name: "XGSPON ONU Stick".to_string(),
            scan_interval_secs: None,
        }
    }

    #[test]
    fn test_resolve_defaults() {
        let config =
            ResolvedConfig::resolve(&settings(), &OnuOptions::default(), PathBuf::from("/k"))
                .unwrap();
        assert_eq!(config.poll_interval_secs, DEFAULT_SCAN_INTERVAL_SECS);
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.exec_timeout_secs, 10);
    }

    #[test]
    fn test_resolve_precedence_option_over_stored() {
        let mut s = settings();
        s.scan_interval_secs = Some(120);
        let options = OnuOptions {
            scan_interval_secs: Some(300),
        };
        let config = ResolvedConfig::resolve(&s, &options, PathBuf::from("/k")).unwrap();
        assert_eq!(config.poll_interval_secs, 300);
    }

    #[test]
    fn test_resolve_precedence_stored_over_default() {
        let mut s = settings();
        s.scan_interval_secs = Some(120);
        let config =
            ResolvedConfig::resolve(&s, &OnuOptions::default(), PathBuf::from("/k")).unwrap();
        assert_eq!(config.poll_interval_secs, 120);
    }

    #[test]
    fn test_resolve_rejects_bad_interval() {
        let options = OnuOptions {
            scan_interval_secs: Some(5),
        };
        let err = ResolvedConfig::resolve(&settings(), &options, PathBuf::from("/k")).unwrap_err();
        assert!(matches!(err, ConfigError::IntervalOutOfRange(5)));
    }

    #[test]
    fn test_resolve_rejects_empty_host_and_user() {
        let mut s = settings();
        s.host = "  ".to_string();
        assert!(matches!(
            ResolvedConfig::resolve(&s, &OnuOptions::default(), PathBuf::from("/k")),
            Err(ConfigError::MissingHost)
        ));

        let mut s = settings();
        s.username = String::new();
        assert!(matches!(
            ResolvedConfig::resolve(&s, &OnuOptions::default(), PathBuf::from("/k")),
            Err(ConfigError::MissingUsername)
        ));
    }

    #[test]
    fn test_clamp_interval() {
        assert_eq!(clamp_interval(5), MIN_SCAN_INTERVAL_SECS);
        assert_eq!(clamp_interval(60), 60);
        assert_eq!(clamp_interval(100_000), MAX_SCAN_INTERVAL_SECS);
    }

    #[test]
    fn test_settings_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        save_settings(&path, &settings()).unwrap();
        let loaded = load_settings(&path).unwrap();
        assert_eq!(loaded, settings());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_settings(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_settings_defaults_from_minimal_toml() {
        let s: OnuSettings = toml::from_str("host = \"h\"\nusername = \"u\"\n").unwrap();
        assert_eq!(s.device_manufacturer, "Unknown");
        assert_eq!(s.device_name, "XGSPON ONU Stick");
        assert!(s.scan_interval_secs.is_none());
    }
}
