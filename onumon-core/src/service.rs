//! Per-installation service handle
//!
//! Owns the resolved configuration and the key store for one device and
//! exposes the control operations that are not part of the poll cycle.

use crate::config::ResolvedConfig;
use crate::error::OnuResult;
use crate::keys::{KeyPair, KeyStore, RotationOutcome};
use crate::session::SshSession;

/// Control operations for one configured ONU device.
#[derive(Debug)]
pub struct OnuService {
    config: ResolvedConfig,
    keys: KeyStore,
}

impl OnuService {
    /// Builds a service from an already-resolved configuration.
    #[must_use]
    pub fn new(config: ResolvedConfig, keys: KeyStore) -> Self {
        Self { config, keys }
    }

    /// The resolved configuration this service operates on.
    #[must_use]
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Reboots the device.
    ///
    /// The connection dropping mid-command is the expected outcome and is
    /// not an error; the device is unreachable until it comes back up.
    ///
    /// # Errors
    ///
    /// Returns an error when the key file is missing or the device
    /// rejects authentication.
    pub async fn reboot(&self) -> OnuResult<()> {
        let session = SshSession::open(&self.config)?;
        tracing::info!(host = %self.config.host, "rebooting device");
        session.fire_and_forget("reboot").await?;
        Ok(())
    }

    /// Returns the installation's key pair, generating one if absent.
    ///
    /// # Errors
    ///
    /// Returns an error when key generation fails.
    pub async fn key_pair(&self) -> OnuResult<KeyPair> {
        Ok(self.keys.ensure().await?)
    }

    /// Rotates the SSH key pair, backing up the previous private key.
    ///
    /// The new public key must be installed on the device before the next
    /// fetch cycle can authenticate; until then the backup holds the only
    /// trusted key.
    ///
    /// # Errors
    ///
    /// Returns an error when backup or regeneration fails.
    pub async fn regenerate_credentials(&self) -> OnuResult<RotationOutcome> {
        tracing::info!(host = %self.config.host, "rotating SSH credentials");
        Ok(self.keys.rotate().await?)
    }

    /// Removes the installation's key material. Backups are kept.
    ///
    /// # Errors
    ///
    /// Returns an error on IO failure.
    pub async fn remove_credentials(&self) -> OnuResult<()> {
        Ok(self.keys.remove().await?)
    }
}
