//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// `onumon` command-line interface for polling an ONU stick
#[derive(Parser)]
#[command(name = "onumon")]
#[command(author, version, about = "XGS-PON ONU stick telemetry over SSH")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration directory
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Configure a device and generate its SSH key
    #[command(about = "Store device settings and generate the SSH key pair")]
    Init {
        /// Device host address (hostname or IP)
        #[arg(short = 'H', long)]
        host: String,

        /// SSH username
        #[arg(short, long, default_value = "root")]
        user: String,

        /// Poll interval in seconds (30-3600)
        #[arg(short, long)]
        interval: Option<u32>,

        /// Device manufacturer shown in identity output
        #[arg(long)]
        manufacturer: Option<String>,

        /// Display name for the device
        #[arg(long)]
        name: Option<String>,
    },

    /// Fetch one telemetry snapshot
    #[command(about = "Run one fetch cycle and print the snapshot")]
    Fetch {
        /// Output format
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Poll continuously and print each snapshot
    #[command(about = "Poll on an interval until interrupted")]
    Watch {
        /// Output format
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,

        /// Poll interval override in seconds (30-3600)
        #[arg(short, long)]
        interval: Option<u32>,
    },

    /// Reboot the device
    #[command(about = "Reboot the device over SSH")]
    Reboot {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Rotate the SSH key pair
    #[command(about = "Back up the current key and generate a new one")]
    RotateKey,

    /// Print the public key for installation on the device
    #[command(about = "Print the public key to install on the device")]
    ShowKey,
}

/// Output format for snapshot rendering
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table grouped by category
    Table,
    /// Single JSON object
    Json,
}
