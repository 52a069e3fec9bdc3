// # ddns-core
//
// Core library for the one-shot DDNS-to-A-record updater.
//
// ## Architecture Overview
//
// Each invocation is a single pass, driven by an external scheduler:
// - **ConfigStore**: Locked configuration holding the last known IP
// - **AddressResolver**: Resolves the dynamic DNS hostname
// - **ChangeDetector**: Compares the resolved and stored addresses
// - **RecordUpdater**: Replaces the A-record of one authoritative host
// - **RunOrchestrator**: Sequences the above and decides what to persist
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from resolver and provider crates
// 2. **Explicit Outcomes**: Every step returns a value the orchestrator inspects
// 3. **All-or-Nothing State**: The last known IP only advances after every host succeeded
// 4. **Library-First**: The binary is a thin wrapper around this crate

pub mod config;
pub mod detector;
pub mod engine;
pub mod error;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::{CONFIG_VERSION, HOST_PLACEHOLDER, IpVersion, UpdaterConfig};
pub use detector::{Change, detect_change};
pub use engine::{EngineOptions, RunEvent, RunOrchestrator, RunOutcome, RunReport, UpdateOutcome};
pub use error::{Error, Result};
pub use state::{FileConfigStore, MemoryConfigStore};
pub use traits::{AddressResolver, ConfigStore, RecordUpdater};
