// # Logging Setup
//
// Filter precedence: `RUST_LOG`, then `--log-level`, then `[logging].level`.
// Output always goes to stderr; `[logging].file` adds a plain-text layer
// appending to that file. Rotation is left to the operating system.

use anyhow::{Context, Result};
use ddns_core::config::LoggingConfig;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global subscriber
pub fn init(config: &LoggingConfig, cli_level: Option<&str>, config_path: &Path) -> Result<()> {
    let level = cli_level.unwrap_or(&config.level);
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid log level '{}'", level))?,
    };

    let file_layer = match &config.file {
        Some(file) => {
            let path = resolve_log_path(config_path, file);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;

            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .context("failed to set tracing subscriber")?;

    Ok(())
}

/// Relative log paths are taken from the configuration file's directory
fn resolve_log_path(config_path: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        return file.to_path_buf();
    }

    match config_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(file),
        _ => file.to_path_buf(),
    }
}
