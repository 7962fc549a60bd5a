//! Device reboot command.

use std::io::{BufRead, Write};
use std::path::Path;

use onumon_core::OnuService;

use crate::error::CliError;
use crate::util;

/// Reboot command handler. Prompts for confirmation unless `--yes`.
pub async fn cmd_reboot(config_path: Option<&Path>, yes: bool) -> Result<(), CliError> {
    let (config, keys) = util::load_context(config_path, None)?;

    if !yes && !confirm(&config.host)? {
        println!("Aborted.");
        return Ok(());
    }

    let host = config.host.clone();
    let service = OnuService::new(config, keys);
    service.reboot().await.map_err(CliError::from)?;

    println!("Reboot command sent to {host}; the device will be unreachable while it restarts.");
    Ok(())
}

fn confirm(host: &str) -> Result<bool, CliError> {
    print!("Reboot {host}? [y/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
