//! Config store implementations
//!
//! This module provides concrete implementations of the ConfigStore trait.

pub mod file;
pub mod memory;

pub use file::FileConfigStore;
pub use memory::MemoryConfigStore;
