// # ddns-updater
//
// One-shot binary propagating the address behind a dynamic DNS hostname to
// the A-records of authoritative hosts. Meant to be started periodically by
// cron or a systemd timer.
//
// This is a THIN integration layer: it opens the locked configuration,
// installs logging, wires the system resolver and the Gandi updater into the
// core orchestrator, runs one pass and turns the outcome into an exit code.
// All decisions about what to update and what to persist live in ddns-core.
//
// ## Usage
//
// ```bash
// ddns-updater --config /etc/ddns/dns_updater.toml
// RUST_LOG=debug ddns-updater
// ```
//
// A missing configuration file is replaced by a commented template and the
// process exits with a configuration error.

mod logging;

use clap::Parser;
use ddns_core::traits::ConfigStore;
use ddns_core::{EngineOptions, Error, FileConfigStore, RunOrchestrator, RunOutcome};
use ddns_ip_resolver::SystemResolver;
use ddns_provider_gandi::GandiUpdater;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// Exit codes for the possible run verdicts
///
/// Non-zero codes let the scheduler (and whoever reads its mail) tell a
/// misconfiguration apart from a transient provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Nothing to do, or every host updated and the address persisted
    Success = 0,
    /// Missing, invalid or locked configuration
    ConfigError = 1,
    /// Logging, runtime or HTTP client could not be set up
    RuntimeSetupError = 2,
    /// The DDNS hostname could not be resolved
    ResolutionError = 3,
    /// At least one host was not updated
    PartialFailure = 4,
    /// Every host was updated but the address could not be written back
    PersistError = 5,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl From<&RunOutcome> for DdnsExitCode {
    fn from(outcome: &RunOutcome) -> Self {
        match outcome {
            RunOutcome::NoChange | RunOutcome::Persisted => DdnsExitCode::Success,
            RunOutcome::PartialFailure { .. } => DdnsExitCode::PartialFailure,
            RunOutcome::ResolutionFailed(_) => DdnsExitCode::ResolutionError,
            RunOutcome::PersistFailed(_) => DdnsExitCode::PersistError,
        }
    }
}

/// Update authoritative A-records from a dynamic DNS hostname
#[derive(Parser, Debug)]
#[command(name = "ddns-updater")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (TOML)
    #[arg(short, long, default_value = "dns_updater.toml")]
    config: PathBuf,

    /// Log level override (trace, debug, info, warn, error); RUST_LOG wins
    #[arg(short, long)]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Single pass, no spawned tasks: a current-thread runtime is enough
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeSetupError.into();
        }
    };

    rt.block_on(run(args)).into()
}

async fn run(args: Args) -> DdnsExitCode {
    if let Some(level) = &args.log_level
        && let Err(e) = ddns_core::config::validate_log_level(level)
    {
        eprintln!("{}", e);
        return DdnsExitCode::ConfigError;
    }

    // Logging is configured from the file, so errors up to here go to stderr
    let mut store = match FileConfigStore::open(&args.config).await {
        Ok(store) => store,
        Err(e @ Error::ConfigCreated { .. }) => {
            eprintln!("{}", e);
            return DdnsExitCode::ConfigError;
        }
        Err(e) => {
            eprintln!("Configuration error in {}: {}", args.config.display(), e);
            return DdnsExitCode::ConfigError;
        }
    };

    if let Err(e) = logging::init(
        &store.config().logging,
        args.log_level.as_deref(),
        store.path(),
    ) {
        eprintln!("Failed to initialize logging: {:#}", e);
        return DdnsExitCode::RuntimeSetupError;
    }

    let config = store.config();
    info!(
        config = %store.path().display(),
        ddns_hostname = %config.general.ddns_hostname,
        hosts = config.gandi.hosts.len(),
        "Starting ddns-updater"
    );

    let resolver = SystemResolver::from_config(&config.resolver);
    let updater = match GandiUpdater::from_config(&config.gandi) {
        Ok(updater) => updater,
        Err(e) => {
            error!(error = %e, "Failed to create Gandi updater");
            return DdnsExitCode::RuntimeSetupError;
        }
    };
    let options = EngineOptions::from(&config.engine);

    let orchestrator = RunOrchestrator::new(Box::new(resolver), Box::new(updater), options);
    let report = orchestrator.run(&mut store).await;

    let code = DdnsExitCode::from(&report.outcome);
    let exit_code = code as u8;
    info!(outcome = ?report.outcome, exit_code, "Run finished");
    code
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let cases = [
            (RunOutcome::NoChange, 0),
            (RunOutcome::Persisted, 0),
            (
                RunOutcome::ResolutionFailed(Error::resolution("home.example-ddns.net", "NXDOMAIN")),
                3,
            ),
            (
                RunOutcome::PartialFailure {
                    failed_hosts: vec!["example.org".to_string()],
                },
                4,
            ),
            (RunOutcome::PersistFailed(Error::persist("disk full")), 5),
        ];

        for (outcome, expected) in cases {
            assert_eq!(DdnsExitCode::from(&outcome) as u8, expected, "{:?}", outcome);
        }
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["ddns-updater"]);
        assert_eq!(args.config, PathBuf::from("dns_updater.toml"));
        assert!(args.log_level.is_none());

        let args = Args::parse_from(["ddns-updater", "--config", "/etc/ddns.toml", "-l", "debug"]);
        assert_eq!(args.config, PathBuf::from("/etc/ddns.toml"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }
}
