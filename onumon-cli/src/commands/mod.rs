//! Command handler modules for the CLI.

mod fetch;
mod init;
mod key;
mod reboot;
mod watch;

use std::path::Path;

use crate::cli::Commands;
use crate::error::CliError;

/// Dispatch a CLI command to the appropriate handler.
pub async fn dispatch(config_path: Option<&Path>, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Init {
            host,
            user,
            interval,
            manufacturer,
            name,
        } => {
            init::cmd_init(
                config_path,
                init::InitParams {
                    host: &host,
                    user: &user,
                    interval,
                    manufacturer: manufacturer.as_deref(),
                    name: name.as_deref(),
                },
            )
            .await
        }
        Commands::Fetch { format } => fetch::cmd_fetch(config_path, format).await,
        Commands::Watch { format, interval } => {
            watch::cmd_watch(config_path, format, interval).await
        }
        Commands::Reboot { yes } => reboot::cmd_reboot(config_path, yes).await,
        Commands::RotateKey => key::cmd_rotate(config_path).await,
        Commands::ShowKey => key::cmd_show(config_path).await,
    }
}
