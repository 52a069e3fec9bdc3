// # Config Store Trait
//
// Defines the interface of the resource holding the configuration and the
// last known IP.
//
// ## Purpose
//
// The store is the updater's only persistent state. A store value is the
// scoped handle for one run: it is loaded (and, for the file store, locked)
// before the run starts and released when it is dropped.
//
// ## Implementations
//
// - File-based: TOML file guarded by an advisory lock
// - Memory: for tests and embedding

use async_trait::async_trait;

use crate::config::UpdaterConfig;

/// Trait for configuration store implementations
///
/// # Invariant
///
/// `last_known_ip` only ever advances to an address that was resolved in
/// the same run and accepted by every configured host. The orchestrator is
/// the only caller of [`ConfigStore::set_last_known_ip`] and enforces this.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// The validated configuration as loaded at run start
    fn config(&self) -> &UpdaterConfig;

    /// The last address propagated to every host, empty before the first success
    fn last_known_ip(&self) -> &str {
        self.config().last_known_ip()
    }

    /// Persist a newly propagated address
    ///
    /// # Returns
    ///
    /// - `Ok(())`: the new value is durable
    /// - `Err(Error::Persist)`: storage error; the caller must report failure
    async fn set_last_known_ip(&mut self, ip: &str) -> Result<(), crate::Error>;
}
