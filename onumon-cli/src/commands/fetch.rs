//! One-shot fetch command.

use std::path::Path;

use onumon_core::fetch_snapshot;
use onumon_core::session::SshSession;

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::format;
use crate::util;

/// Fetch command handler: one cycle, one printed snapshot.
pub async fn cmd_fetch(config_path: Option<&Path>, output: OutputFormat) -> Result<(), CliError> {
    let (config, _keys) = util::load_context(config_path, None)?;
    let session = SshSession::open(&config).map_err(CliError::from)?;

    let snapshot = fetch_snapshot(&session, &config)
        .await
        .map_err(CliError::from)?;

    match output {
        OutputFormat::Table => print!("{}", format::format_table(&snapshot)),
        OutputFormat::Json => println!("{}", format::format_json(&snapshot)?),
    }
    Ok(())
}
