//! Core traits for the updater
//!
//! This module defines the seams between the run workflow and the outside world.
//!
//! - [`AddressResolver`]: Resolve the DDNS hostname
//! - [`RecordUpdater`]: Replace a host's record via the provider API
//! - [`ConfigStore`]: Configuration and last-known-IP persistence

pub mod address_resolver;
pub mod config_store;
pub mod record_updater;

pub use address_resolver::AddressResolver;
pub use config_store::ConfigStore;
pub use record_updater::RecordUpdater;
