//! `onumon` CLI - SSH telemetry for 8311 XGS-PON ONU sticks
//!
//! Provides commands for configuring a device, fetching or continuously
//! watching telemetry snapshots, rebooting the device, and managing the
//! SSH key pair.

mod cli;
mod commands;
mod error;
mod format;
mod util;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("onumon_core={default_level},onumon_cli={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let config_path = cli.config.as_deref();
    if let Err(e) = commands::dispatch(config_path, cli.command).await {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}
