//! SSH key material for one installation
//!
//! Keys are generated through the system `ssh-keygen`, stored under the
//! installation's storage directory with owner-only permissions, and
//! rotated by backing up the old pair before generating a new one. A
//! rotation backup is never overwritten.

use std::path::{Path, PathBuf};

use chrono::Local;
use tokio::sync::Mutex;

/// Errors raised by key generation and rotation.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    /// `ssh-keygen` could not be spawned
    #[error("failed to run ssh-keygen: {0}")]
    Spawn(#[source] std::io::Error),

    /// `ssh-keygen` exited with a failure status
    #[error("ssh-keygen failed: {0}")]
    Keygen(String),

    /// IO failure touching key files
    #[error("key file IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Public key file missing after generation
    #[error("public key file not found: {0}")]
    PublicKeyMissing(PathBuf),
}

/// Result type for key operations
pub type KeyResult<T> = Result<T, KeyError>;

/// A generated key pair: the private key path and the public key text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    /// Path of the private key file
    pub private_key_path: PathBuf,
    /// Public key in OpenSSH one-line format
    pub public_key: String,
}

/// Outcome of a key rotation.
#[derive(Debug, Clone)]
pub struct RotationOutcome {
    /// The freshly generated pair
    pub key: KeyPair,
    /// Where the previous private key was preserved
    pub backup_path: Option<PathBuf>,
}

/// Manages the key pair for one installation.
///
/// All mutating operations serialize on an internal lock so a rotation
/// can never race a concurrent read of a half-written key file.
#[derive(Debug)]
pub struct KeyStore {
    key_path: PathBuf,
    lock: Mutex<()>,
}

impl KeyStore {
    /// Creates a store for `installation_id` under `storage_dir`.
    ///
    /// The key filename is derived from the installation id, lowercased
    /// with spaces replaced, so multiple installations sharing a storage
    /// directory keep distinct key files.
    #[must_use]
    pub fn new(storage_dir: &Path, installation_id: &str) -> Self {
        let slug = installation_id
            .trim()
            .to_lowercase()
            .replace(char::is_whitespace, "_");
        Self {
            key_path: storage_dir.join(format!("onu_{slug}.key")),
            lock: Mutex::new(()),
        }
    }

    /// Path of the private key file.
    #[must_use]
    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    /// Returns the existing key pair, generating one if absent.
    ///
    /// # Errors
    ///
    /// Returns a [`KeyError`] when generation fails or key files cannot
    /// be read.
    pub async fn ensure(&self) -> KeyResult<KeyPair> {
        let _guard = self.lock.lock().await;
        if !self.key_path.exists() {
            generate(&self.key_path).await?;
        }
        self.read_pair()
    }

    /// Replaces the key pair, preserving the old private key as a backup.
    ///
    /// The caller must push the new public key to the device afterwards;
    /// until then the device only trusts the backed-up key.
    ///
    /// # Errors
    ///
    /// Returns a [`KeyError`] when the backup, removal or regeneration
    /// fails.
    pub async fn rotate(&self) -> KeyResult<RotationOutcome> {
        let _guard = self.lock.lock().await;

        let backup_path = if self.key_path.exists() {
            let backup = backup_destination(&self.key_path);
            std::fs::copy(&self.key_path, &backup)?;
            std::fs::remove_file(&self.key_path)?;
            let public = public_path(&self.key_path);
            if public.exists() {
                std::fs::remove_file(&public)?;
            }
            tracing::info!(backup = %backup.display(), "previous key backed up");
            Some(backup)
        } else {
            None
        };

        generate(&self.key_path).await?;
        Ok(RotationOutcome {
            key: self.read_pair()?,
            backup_path,
        })
    }

    /// Removes the key pair. Backups are left in place.
    ///
    /// # Errors
    ///
    /// Returns a [`KeyError`] on IO failure.
    pub async fn remove(&self) -> KeyResult<()> {
        let _guard = self.lock.lock().await;
        if self.key_path.exists() {
            std::fs::remove_file(&self.key_path)?;
        }
        let public = public_path(&self.key_path);
        if public.exists() {
            std::fs::remove_file(&public)?;
        }
        Ok(())
    }

    fn read_pair(&self) -> KeyResult<KeyPair> {
        let public = public_path(&self.key_path);
        if !public.exists() {
            return Err(KeyError::PublicKeyMissing(public));
        }
        Ok(KeyPair {
            private_key_path: self.key_path.clone(),
            public_key: std::fs::read_to_string(public)?.trim().to_string(),
        })
    }
}

fn public_path(key_path: &Path) -> PathBuf {
    let mut os = key_path.as_os_str().to_os_string();
    os.push(".pub");
    PathBuf::from(os)
}

/// Picks a timestamped backup path that does not collide with an
/// existing backup, even for rotations within the same second.
fn backup_destination(key_path: &Path) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let base = format!("{}.backup_{stamp}", key_path.display());
    let mut candidate = PathBuf::from(&base);
    let mut counter = 1u32;
    while candidate.exists() {
        candidate = PathBuf::from(format!("{base}_{counter}"));
        counter += 1;
    }
    candidate
}

/// Generates an RSA key pair at `key_path` with no passphrase.
async fn generate(key_path: &Path) -> KeyResult<()> {
    if let Some(parent) = key_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let output = tokio::process::Command::new("ssh-keygen")
        .arg("-q")
        .arg("-t")
        .arg("rsa")
        .arg("-b")
        .arg("2048")
        .arg("-N")
        .arg("")
        .arg("-f")
        .arg(key_path)
        .output()
        .await
        .map_err(KeyError::Spawn)?;

    if !output.status.success() {
        return Err(KeyError::Keygen(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(key_path, std::fs::Permissions::from_mode(0o600))?;
    }

    tracing::info!(path = %key_path.display(), "generated SSH key pair");
    Ok(())
}
