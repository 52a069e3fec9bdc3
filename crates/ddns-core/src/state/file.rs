// # File Config Store
//
// TOML-file implementation of ConfigStore.
//
// ## Exclusive Access
//
// Opening the store takes an exclusive advisory lock on `<config>.lock`.
// The lock is held by the store value and released when it is dropped, so
// two overlapping runs can never interleave reads and writes of the last
// known IP. The lock lives on a sibling file because persisting replaces
// the configuration file itself.
//
// ## Atomic Writes
//
// - New content written to `<config>.tmp` and synced
// - Current file copied to `<config>.backup`
// - Temp file renamed over the configuration
//
// ## First Run
//
// A missing configuration file is replaced by a commented skeleton and the
// open fails with `Error::ConfigCreated`.

use async_trait::async_trait;
use chrono::Utc;
use fs2::FileExt;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::config::{SKELETON, UpdaterConfig};
use crate::traits::config_store::ConfigStore;

/// File-based configuration store holding the run lock
///
/// # Example
///
/// ```rust,no_run
/// use ddns_core::state::FileConfigStore;
/// use ddns_core::traits::ConfigStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut store = FileConfigStore::open("dns_updater.toml").await?;
///     println!("last known ip: {:?}", store.last_known_ip());
///
///     store.set_last_known_ip("203.0.113.5").await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileConfigStore {
    path: PathBuf,
    config: UpdaterConfig,
    _lock: RunLock,
}

impl FileConfigStore {
    /// Lock, load and validate the configuration at `path`
    ///
    /// # Errors
    ///
    /// - `Error::Locked`: another run holds the lock
    /// - `Error::ConfigCreated`: the file did not exist; a skeleton was written
    /// - `Error::Config` / `Error::TomlDe`: invalid configuration
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let lock = RunLock::acquire(&sibling(&path, "lock"))?;

        if !fs::try_exists(&path).await? {
            Self::write_skeleton(&path).await?;
            return Err(Error::ConfigCreated { path });
        }

        let raw = fs::read_to_string(&path).await?;
        let config = UpdaterConfig::from_toml_str(&raw)?;

        tracing::debug!(
            path = %path.display(),
            hosts = config.gandi.hosts.len(),
            "Loaded configuration"
        );

        Ok(Self {
            path,
            config,
            _lock: lock,
        })
    }

    /// Path of the configuration file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write_skeleton(path: &Path) -> Result<(), Error> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await?;
        file.write_all(SKELETON.as_bytes()).await?;
        file.flush().await?;

        tracing::warn!(path = %path.display(), "Created configuration template");
        Ok(())
    }

    /// Write `config` to disk atomically
    async fn write_config(&self, config: &UpdaterConfig) -> Result<(), Error> {
        let toml = config
            .to_toml_string()
            .map_err(|e| Error::persist(format!("Failed to serialize configuration: {}", e)))?;

        let temp_path = sibling(&self.path, "tmp");
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::persist(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            // Keep the original mode: the file carries the API key.
            if let Ok(metadata) = fs::metadata(&self.path).await {
                fs::set_permissions(&temp_path, metadata.permissions())
                    .await
                    .map_err(|e| {
                        Error::persist(format!(
                            "Failed to set permissions on {}: {}",
                            temp_path.display(),
                            e
                        ))
                    })?;
            }

            file.write_all(toml.as_bytes()).await.map_err(|e| {
                Error::persist(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.sync_all().await.map_err(|e| {
                Error::persist(format!(
                    "Failed to sync temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        let backup_path = sibling(&self.path, "backup");
        if let Err(e) = fs::copy(&self.path, &backup_path).await {
            tracing::warn!("Failed to create backup {}: {}", backup_path.display(), e);
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::persist(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("Configuration written to {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    async fn set_last_known_ip(&mut self, ip: &str) -> Result<(), Error> {
        let mut updated = self.config.clone();
        updated.general.ip = ip.to_string();
        updated.general.ip_updated_at = Some(Utc::now());

        self.write_config(&updated).await?;
        self.config = updated;
        Ok(())
    }
}

/// Exclusive advisory lock held for the duration of a run
#[derive(Debug)]
struct RunLock {
    file: std::fs::File,
    path: PathBuf,
}

impl RunLock {
    fn acquire(path: &Path) -> Result<Self, Error> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)?;

        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => Ok(Self {
                file,
                path: path.to_path_buf(),
            }),
            Err(e) if is_contended(&e) => Err(Error::Locked {
                path: path.to_path_buf(),
            }),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!("Failed to release lock {}: {}", self.path.display(), e);
        }
    }
}

fn is_contended(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

/// `<path>.<suffix>`, keeping the original extension
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
