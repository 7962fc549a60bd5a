//! SSH transport for the diagnostic batch
//!
//! Commands run through a spawned `ssh` client process rather than an
//! in-process SSH library, with key-only authentication and
//! trust-on-first-use host key handling. The [`CommandRunner`] trait is
//! the seam between the fetch pipeline and the transport so tests can
//! inject canned output.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::ResolvedConfig;
use crate::error::{FetchError, FetchResult};

/// Default bound for connecting, in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default bound for executing the batched command, in seconds.
pub const DEFAULT_EXEC_TIMEOUT_SECS: u64 = 10;

/// Executes a remote shell command and returns its combined stdout.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `command` on the device.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] on any transport failure or when the
    /// remote command writes to stderr.
    async fn run(&self, command: &str) -> FetchResult<String>;
}

/// An authenticated session against one ONU device.
///
/// Each `execute` spawns a fresh `ssh` process; the process exiting is the
/// scoped resource release, so a failed decode can never leak a channel.
#[derive(Debug, Clone)]
pub struct SshSession {
    host: String,
    username: String,
    key_path: PathBuf,
    connect_timeout: Duration,
    exec_timeout: Duration,
}

impl SshSession {
    /// Opens a session for the configured device.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::KeyFileMissing`] when the private key file
    /// does not exist. All other failures surface on the first execute.
    pub fn open(config: &ResolvedConfig) -> FetchResult<Self> {
        if !config.key_path.exists() {
            return Err(FetchError::KeyFileMissing(config.key_path.clone()));
        }
        Ok(Self {
            host: config.host.clone(),
            username: config.username.clone(),
            key_path: config.key_path.clone(),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            exec_timeout: Duration::from_secs(config.exec_timeout_secs),
        })
    }

    fn command(&self, remote_command: &str) -> Command {
        let mut cmd = Command::new("ssh");
        cmd.arg("-o").arg("BatchMode=yes");
        // Trust-on-first-use: accept unknown host keys, reject changed ones
        cmd.arg("-o").arg("StrictHostKeyChecking=accept-new");
        cmd.arg("-o")
            .arg(format!("ConnectTimeout={}", self.connect_timeout.as_secs()));
        cmd.arg("-i").arg(&self.key_path);
        cmd.arg(format!("{}@{}", self.username, self.host));
        cmd.arg(remote_command);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd
    }

    /// Executes a remote command and returns its stdout.
    ///
    /// Any stderr text from the remote command (after dropping the ssh
    /// client's own known-hosts notices) fails the execution — one
    /// misbehaving sub-command discards the whole cycle rather than
    /// silently dropping a field.
    ///
    /// # Errors
    ///
    /// Transport failures are classified into the [`FetchError`] taxonomy
    /// from the ssh client's stderr text.
    pub async fn execute(&self, remote_command: &str) -> FetchResult<String> {
        tracing::debug!(host = %self.host, len = remote_command.len(), "executing remote command");

        let budget = self.connect_timeout + self.exec_timeout;
        let output = tokio::time::timeout(budget, self.command(remote_command).output())
            .await
            .map_err(|_| FetchError::Timeout {
                host: self.host.clone(),
                secs: budget.as_secs(),
            })?
            .map_err(FetchError::Spawn)?;

        let stderr = strip_client_notices(&String::from_utf8_lossy(&output.stderr));

        // ssh itself exits 255 on transport failure; remote exit codes
        // pass through and are not checked (the `;` batch join already
        // absorbs failing sub-commands).
        if output.status.code() == Some(255) {
            return Err(self.classify(&stderr));
        }
        if !stderr.is_empty() {
            tracing::warn!(host = %self.host, stderr = %stderr, "remote command wrote to stderr");
            return Err(FetchError::RemoteStderr(stderr));
        }

        let stdout = String::from_utf8(output.stdout)?;
        tracing::debug!(host = %self.host, bytes = stdout.len(), "remote command completed");
        Ok(stdout)
    }

    /// Issues a command without caring whether the connection survives it.
    ///
    /// Used for `reboot`: the device dropping the connection mid-command
    /// is the expected outcome, so timeouts and transport teardown are
    /// not errors. Authentication failures still are.
    ///
    /// # Errors
    ///
    /// Returns an error only when the client cannot be spawned or the
    /// device rejects authentication.
    pub async fn fire_and_forget(&self, remote_command: &str) -> FetchResult<()> {
        let budget = self.connect_timeout + self.exec_timeout;
        let result = tokio::time::timeout(budget, self.command(remote_command).output()).await;

        match result {
            // Connection dropped by the rebooting device
            Err(_) => Ok(()),
            Ok(Err(e)) => Err(FetchError::Spawn(e)),
            Ok(Ok(output)) => {
                if output.status.code() == Some(255) {
                    let stderr = strip_client_notices(&String::from_utf8_lossy(&output.stderr));
                    if let err @ FetchError::AuthFailed { .. } = self.classify(&stderr) {
                        return Err(err);
                    }
                }
                Ok(())
            }
        }
    }

    /// Maps the ssh client's stderr text onto the error taxonomy.
    fn classify(&self, stderr: &str) -> FetchError {
        let lower = stderr.to_lowercase();

        if lower.contains("permission denied") || lower.contains("publickey") {
            return FetchError::AuthFailed {
                user: self.username.clone(),
                host: self.host.clone(),
            };
        }
        if lower.contains("timed out") {
            return FetchError::Timeout {
                host: self.host.clone(),
                secs: self.connect_timeout.as_secs(),
            };
        }
        if lower.contains("no such file or directory")
            && (lower.contains("identity") || lower.contains("key"))
        {
            return FetchError::KeyFileMissing(self.key_path.clone());
        }
        if lower.contains("connection refused")
            || lower.contains("no route to host")
            || lower.contains("network is unreachable")
            || lower.contains("could not resolve hostname")
        {
            return FetchError::Unreachable {
                host: self.host.clone(),
                reason: stderr.trim().to_string(),
            };
        }

        FetchError::Transport(stderr.trim().to_string())
    }
}

#[async_trait]
impl CommandRunner for SshSession {
    async fn run(&self, command: &str) -> FetchResult<String> {
        self.execute(command).await
    }
}

/// Drops the ssh client's own known-hosts notices from stderr.
///
/// With a spawned `ssh` process the client's trust-on-first-use notice
/// shares the stderr stream with the remote command, and must not count
/// as remote stderr output.
fn strip_client_notices(stderr: &str) -> String {
    stderr
        .lines()
        .filter(|line| {
            let line = line.trim();
            !line.is_empty()
                && !line.starts_with("Warning: Permanently added")
                && !line.starts_with("Warning: Identity file")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
