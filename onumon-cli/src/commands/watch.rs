//! Continuous polling command.

use std::path::Path;
use std::sync::Arc;

use onumon_core::poller::{PollEvent, start_poller};
use onumon_core::session::SshSession;

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::format;
use crate::util;

/// Watch command handler: poll until interrupted, printing each cycle.
pub async fn cmd_watch(
    config_path: Option<&Path>,
    output: OutputFormat,
    interval: Option<u32>,
) -> Result<(), CliError> {
    let (config, _keys) = util::load_context(config_path, interval)?;
    let session = SshSession::open(&config).map_err(CliError::from)?;

    eprintln!(
        "Polling {} every {}s (Ctrl-C to stop)",
        config.host, config.poll_interval_secs
    );
    let (handle, mut events) = start_poller(config, Arc::new(session));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                handle.stop().await;
            }
            event = events.recv() => match event {
                Some(PollEvent::Snapshot(snapshot)) => match output {
                    OutputFormat::Table => print!("{}", format::format_table(&snapshot)),
                    OutputFormat::Json => println!("{}", format::format_json(&snapshot)?),
                },
                Some(PollEvent::CycleFailed(reason)) => {
                    eprintln!("cycle failed: {reason}");
                }
                Some(PollEvent::Stopped) | None => break,
            },
        }
    }
    Ok(())
}
