//! Error types shared across the fetch pipeline
//!
//! Transport and protocol failures are fatal to a fetch cycle and surface
//! as a [`FetchError`]; individual field decoders never error — malformed
//! input degrades that field to unavailable inside the decoders themselves.

use std::path::PathBuf;

/// Errors that abort an entire fetch cycle.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The configured private key file does not exist.
    #[error("SSH key file missing: {0}")]
    KeyFileMissing(PathBuf),

    /// The device rejected the key-based authentication.
    #[error("authentication failed for {user}@{host}")]
    AuthFailed {
        /// SSH username
        user: String,
        /// Device host
        host: String,
    },

    /// Connecting or executing exceeded the configured bound.
    #[error("connection to {host} timed out after {secs}s")]
    Timeout {
        /// Device host
        host: String,
        /// Timeout bound in seconds
        secs: u64,
    },

    /// The device could not be reached (refused, no route, DNS failure).
    #[error("cannot reach {host}: {reason}")]
    Unreachable {
        /// Device host
        host: String,
        /// Underlying client message
        reason: String,
    },

    /// The ssh client reported a failure that fits no narrower category.
    #[error("ssh transport error: {0}")]
    Transport(String),

    /// The ssh client process could not be spawned.
    #[error("failed to spawn ssh client: {0}")]
    Spawn(#[source] std::io::Error),

    /// The batched command wrote to stderr; the whole cycle is discarded.
    #[error("remote command produced stderr output: {0}")]
    RemoteStderr(String),

    /// The combined output was not valid UTF-8.
    #[error("invalid UTF-8 in remote output")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// The batched command produced no output at all.
    #[error("no output from batched command")]
    NoOutput,

    /// Splitting on the boundary produced the wrong number of segments.
    #[error("expected {expected} output segments, got {actual}")]
    SegmentCountMismatch {
        /// Number of commands in the batch
        expected: usize,
        /// Number of segments actually produced
        actual: usize,
    },
}

/// Result type for fetch-cycle operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Top-level error aggregating all library error domains.
#[derive(Debug, thiserror::Error)]
pub enum OnuError {
    /// Fetch-cycle error
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Key management error
    #[error(transparent)]
    Key(#[from] crate::keys::KeyError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for top-level operations
pub type OnuResult<T> = Result<T, OnuError>;
