//! CLI error types and exit codes.

use onumon_core::{FetchError, OnuError};

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, key management, or other local failures
    pub const GENERAL_ERROR: i32 = 1;
    /// Connection failure - the device could not be reached or authenticated
    pub const CONNECTION_FAILURE: i32 = 2;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Device connection or fetch failure
    #[error("Connection error: {0}")]
    Connection(String),

    /// Key management error
    #[error("Key error: {0}")]
    Key(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Maps the error to a process exit code.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Connection(_) => exit_codes::CONNECTION_FAILURE,
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}

impl From<OnuError> for CliError {
    fn from(err: OnuError) -> Self {
        match err {
            OnuError::Fetch(e) => Self::from(e),
            OnuError::Key(e) => Self::Key(e.to_string()),
            OnuError::Config(e) => Self::Config(e.to_string()),
            OnuError::Io(e) => Self::Io(e),
        }
    }
}

impl From<FetchError> for CliError {
    fn from(err: FetchError) -> Self {
        match err {
            // A missing key is a local setup problem, not a device one
            FetchError::KeyFileMissing(path) => {
                Self::Key(format!("SSH key file missing: {}", path.display()))
            }
            other => Self::Connection(other.to_string()),
        }
    }
}
