//! Error types for the updater
//!
//! Every fallible operation in the crate returns [`Result`]. The variants map
//! onto the failure classes the run can end with: configuration problems,
//! resolution failures, per-host API failures and persistence failures.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for updater operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the updater
#[derive(Error, Debug)]
pub enum Error {
    /// Missing, placeholder or otherwise invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// The configuration file did not exist and a skeleton was written
    #[error(
        "Configuration file {} did not exist; a template was created. \
         Fill in the mandatory settings and run again.",
        path.display()
    )]
    ConfigCreated {
        /// Path of the generated skeleton
        path: PathBuf,
    },

    /// Another run holds the configuration lock
    #[error("Configuration {} is locked by another run", path.display())]
    Locked {
        /// Path of the lock file
        path: PathBuf,
    },

    /// The DDNS hostname could not be resolved
    #[error("Failed to resolve {hostname}: {cause}")]
    Resolution {
        /// Hostname that was looked up
        hostname: String,
        /// NXDOMAIN, timeout, network failure, ...
        cause: String,
    },

    /// A record update was not accepted by the provider
    #[error("API error for {host}: {detail}")]
    Api {
        /// Authoritative host the update targeted
        host: String,
        /// Status code or transport cause
        detail: String,
    },

    /// Writing the last known IP back to the configuration failed
    #[error("Failed to persist configuration: {0}")]
    Persist(String),

    /// Filesystem errors outside of persistence (reading, locking)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid TOML for the expected schema
    #[error("Failed to parse configuration: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// Configuration could not be serialized back to TOML
    #[error("Failed to serialize configuration: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a resolution error
    pub fn resolution(hostname: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::Resolution {
            hostname: hostname.into(),
            cause: cause.into(),
        }
    }

    /// Create a per-host API error
    pub fn api(host: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Api {
            host: host.into(),
            detail: detail.into(),
        }
    }

    /// Create a persistence error
    pub fn persist(msg: impl Into<String>) -> Self {
        Self::Persist(msg.into())
    }

    /// Whether this error belongs to the configuration class (exit code 1)
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::ConfigCreated { .. }
                | Self::Locked { .. }
                | Self::TomlDe(_)
                | Self::Io(_)
        )
    }
}
