//! SSH key management commands.

use std::path::Path;

use onumon_core::OnuService;

use crate::error::CliError;
use crate::util;

/// Rotate-key command handler: back up the old pair, generate a new one.
pub async fn cmd_rotate(config_path: Option<&Path>) -> Result<(), CliError> {
    let (config, keys) = util::load_context(config_path, None)?;
    let service = OnuService::new(config, keys);

    let outcome = service
        .regenerate_credentials()
        .await
        .map_err(CliError::from)?;

    if let Some(backup) = &outcome.backup_path {
        println!("Previous key backed up to {}", backup.display());
    }
    println!("\nInstall the new public key on the device before the next fetch:\n");
    println!("{}", outcome.key.public_key);
    Ok(())
}

/// Show-key command handler: print the public key, generating the pair
/// if none exists yet.
pub async fn cmd_show(config_path: Option<&Path>) -> Result<(), CliError> {
    let (config, keys) = util::load_context(config_path, None)?;
    let service = OnuService::new(config, keys);

    let pair = service.key_pair().await.map_err(CliError::from)?;
    println!("{}", pair.public_key);
    Ok(())
}
