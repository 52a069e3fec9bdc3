// # Memory Config Store
//
// In-memory implementation of ConfigStore.
//
// Holds an already validated configuration and never touches disk. Useful
// for embedding the updater in another program and for tests.

use async_trait::async_trait;
use chrono::Utc;

use crate::Error;
use crate::config::UpdaterConfig;
use crate::traits::config_store::ConfigStore;

/// In-memory configuration store
///
/// # Example
///
/// ```rust,ignore
/// use ddns_core::state::MemoryConfigStore;
///
/// let mut store = MemoryConfigStore::new(config)?;
/// orchestrator.run(&mut store).await;
/// assert_eq!(store.persist_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryConfigStore {
    config: UpdaterConfig,
    persist_count: usize,
}

impl MemoryConfigStore {
    /// Create a store from a configuration, validating it first
    pub fn new(config: UpdaterConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            config,
            persist_count: 0,
        })
    }

    /// Number of successful `set_last_known_ip` calls
    pub fn persist_count(&self) -> usize {
        self.persist_count
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    async fn set_last_known_ip(&mut self, ip: &str) -> Result<(), Error> {
        self.config.general.ip = ip.to_string();
        self.config.general.ip_updated_at = Some(Utc::now());
        self.persist_count += 1;
        Ok(())
    }
}
