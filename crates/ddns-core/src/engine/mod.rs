//! Run orchestrator
//!
//! The RunOrchestrator drives one complete pass:
//! - Resolving the DDNS hostname via AddressResolver
//! - Comparing against the stored address
//! - Updating every configured host via RecordUpdater
//! - Persisting the new address only when every host accepted it
//!
//! ## Architecture
//!
//! ```text
//!                        ┌──────────────────┐
//!                        │ RunOrchestrator  │
//!                        └──────────────────┘
//!                                 │
//!        ┌──────────────────┬─────┴────────────┬──────────────────┐
//!        ▼                  ▼                  ▼                  ▼
//! ┌─────────────┐   ┌───────────────┐  ┌───────────────┐   ┌─────────────┐
//! │ ConfigStore │   │AddressResolver│  │ RecordUpdater │   │   Events    │
//! │ (read/set)  │   │ (resolve)     │  │ (per host)    │   │  (notify)   │
//! └─────────────┘   └───────────────┘  └───────────────┘   └─────────────┘
//! ```
//!
//! ## Run Flow
//!
//! ```text
//! Idle → Resolving ─┬─ resolution failed ─────────────→ Done (failure, no writes)
//!                   ├─ Unchanged → NoChange ──────────→ Done (success, no writes)
//!                   └─ Changed → Updating ─┬─ all ok ─→ Persisted → Done (success)
//!                                          └─ any failed → PartialFailure → Done (failure)
//! ```
//!
//! Every host is attempted even after an earlier one failed; the verdict is
//! taken over the collected outcomes, never by returning early.

use crate::detector::{Change, detect_change};
use crate::error::Error;
use crate::traits::{AddressResolver, ConfigStore, RecordUpdater};
use std::net::IpAddr;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Events emitted during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// Run started with the stored state
    RunStarted {
        ddns_hostname: String,
        last_known_ip: String,
    },

    /// DDNS hostname resolved
    IpResolved { ip: String },

    /// DDNS hostname could not be resolved
    ResolutionFailed { error: String },

    /// Resolved address differs from the stored one
    ChangeDetected { previous_ip: String, new_ip: String },

    /// Resolved address equals the stored one
    NoChange { ip: String },

    /// Host accepted the new address
    HostUpdated { host: String, attempts: usize },

    /// Host did not accept the new address
    HostFailed {
        host: String,
        error: String,
        attempts: usize,
    },

    /// New address written to the store
    Persisted { ip: String },

    /// New address not written because some hosts failed
    PersistSkipped { failed_hosts: Vec<String> },

    /// Writing the new address failed after every host succeeded
    PersistFailed { error: String },
}

/// Outcome of one host's update
#[derive(Debug)]
pub struct UpdateOutcome {
    /// Authoritative host
    pub host: String,
    /// Number of requests made for this host
    pub attempts: usize,
    /// Failure of the last attempt, `None` on success
    pub failure: Option<Error>,
}

impl UpdateOutcome {
    /// Whether the provider accepted the update
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

/// Final verdict of a run
#[derive(Debug)]
pub enum RunOutcome {
    /// Resolved address equals the stored one; nothing was written
    NoChange,
    /// Every host was updated and the new address was persisted
    Persisted,
    /// At least one host failed; the stored address was left untouched
    PartialFailure {
        /// Failed hosts in configured order
        failed_hosts: Vec<String>,
    },
    /// The DDNS hostname could not be resolved; nothing was written
    ResolutionFailed(Error),
    /// Every host was updated but the new address could not be stored
    PersistFailed(Error),
}

impl RunOutcome {
    /// Only `NoChange` and `Persisted` count as success
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::NoChange | RunOutcome::Persisted)
    }
}

/// Everything known about a finished run
#[derive(Debug)]
pub struct RunReport {
    /// Stored address at run start
    pub previous_ip: String,
    /// Resolved address, if resolution succeeded
    pub resolved_ip: Option<String>,
    /// Per-host outcomes in configured order (empty unless a change was detected)
    pub host_outcomes: Vec<UpdateOutcome>,
    /// Final verdict
    pub outcome: RunOutcome,
}

/// Run tuning
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Extra immediate attempts for a failed host (0 = exactly one attempt)
    pub update_retries: usize,
}

impl From<&crate::config::EngineConfig> for EngineOptions {
    fn from(config: &crate::config::EngineConfig) -> Self {
        Self {
            update_retries: config.update_retries,
        }
    }
}

/// Orchestrates one resolve → compare → update → persist pass
///
/// ## Lifecycle
///
/// 1. Create with [`RunOrchestrator::new()`]
/// 2. Optionally [`RunOrchestrator::subscribe()`] to run events
/// 3. Call [`RunOrchestrator::run()`] with the locked store
/// 4. Map [`RunOutcome`] to the process exit code
///
/// ## Concurrency
///
/// Hosts are updated one at a time in configured order, so at most one
/// request is in flight to the provider.
pub struct RunOrchestrator {
    /// Resolver for the DDNS hostname
    resolver: Box<dyn AddressResolver>,

    /// Provider API client
    updater: Box<dyn RecordUpdater>,

    /// Run tuning
    options: EngineOptions,

    /// Event sender for external monitoring
    event_tx: Option<mpsc::Sender<RunEvent>>,
}

impl RunOrchestrator {
    /// Create a new orchestrator
    pub fn new(
        resolver: Box<dyn AddressResolver>,
        updater: Box<dyn RecordUpdater>,
        options: EngineOptions,
    ) -> Self {
        Self {
            resolver,
            updater,
            options,
            event_tx: None,
        }
    }

    /// Receive run events on a bounded channel of `capacity`
    pub fn subscribe(&mut self, capacity: usize) -> mpsc::Receiver<RunEvent> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        self.event_tx = Some(tx);
        rx
    }

    /// Execute one run against `store`
    ///
    /// The store is read once at the start and written at most once at
    /// the end, only when the address changed and every host succeeded.
    pub async fn run(&self, store: &mut dyn ConfigStore) -> RunReport {
        let ddns_hostname = store.config().general.ddns_hostname.clone();
        let hosts = store.config().gandi.hosts.clone();
        let previous_ip = store.last_known_ip().to_string();

        info!(
            ddns_hostname = %ddns_hostname,
            last_known_ip = %previous_ip,
            hosts = hosts.len(),
            "Run started"
        );
        self.emit_event(RunEvent::RunStarted {
            ddns_hostname: ddns_hostname.clone(),
            last_known_ip: previous_ip.clone(),
        });

        // Resolving
        let resolved = match self.resolver.resolve(&ddns_hostname).await {
            Ok(ip) => ip,
            Err(e) => {
                error!(
                    ddns_hostname = %ddns_hostname,
                    resolver = self.resolver.resolver_name(),
                    error = %e,
                    "Resolution failed"
                );
                self.emit_event(RunEvent::ResolutionFailed {
                    error: e.to_string(),
                });
                return RunReport {
                    previous_ip,
                    resolved_ip: None,
                    host_outcomes: Vec::new(),
                    outcome: RunOutcome::ResolutionFailed(e),
                };
            }
        };
        let resolved_ip = resolved.to_string();

        info!(ip = %resolved_ip, "Current IP address");
        self.emit_event(RunEvent::IpResolved {
            ip: resolved_ip.clone(),
        });

        if detect_change(&previous_ip, &resolved_ip) == Change::Unchanged {
            info!(ip = %resolved_ip, "The IP address didn't change");
            self.emit_event(RunEvent::NoChange {
                ip: resolved_ip.clone(),
            });
            return RunReport {
                previous_ip,
                resolved_ip: Some(resolved_ip),
                host_outcomes: Vec::new(),
                outcome: RunOutcome::NoChange,
            };
        }

        info!(previous_ip = %previous_ip, new_ip = %resolved_ip, "IP address changed");
        self.emit_event(RunEvent::ChangeDetected {
            previous_ip: previous_ip.clone(),
            new_ip: resolved_ip.clone(),
        });

        // Updating: collect every outcome before deciding
        let mut host_outcomes = Vec::with_capacity(hosts.len());
        for host in &hosts {
            host_outcomes.push(self.update_host(host, resolved).await);
        }

        let failed_hosts: Vec<String> = host_outcomes
            .iter()
            .filter(|outcome| !outcome.succeeded())
            .map(|outcome| outcome.host.clone())
            .collect();

        let outcome = if !failed_hosts.is_empty() {
            warn!(
                failed = failed_hosts.len(),
                total = hosts.len(),
                failed_hosts = ?failed_hosts,
                "Not persisting new IP address, some hosts failed"
            );
            self.emit_event(RunEvent::PersistSkipped {
                failed_hosts: failed_hosts.clone(),
            });
            RunOutcome::PartialFailure { failed_hosts }
        } else {
            match store.set_last_known_ip(&resolved_ip).await {
                Ok(()) => {
                    info!(ip = %resolved_ip, "IP address updated on every host and persisted");
                    self.emit_event(RunEvent::Persisted {
                        ip: resolved_ip.clone(),
                    });
                    RunOutcome::Persisted
                }
                Err(e) => {
                    error!(
                        ip = %resolved_ip,
                        error = %e,
                        "Every host was updated but the new IP address could not be persisted"
                    );
                    self.emit_event(RunEvent::PersistFailed {
                        error: e.to_string(),
                    });
                    RunOutcome::PersistFailed(e)
                }
            }
        };

        RunReport {
            previous_ip,
            resolved_ip: Some(resolved_ip),
            host_outcomes,
            outcome,
        }
    }

    /// Update one host, with the configured number of immediate retries
    async fn update_host(&self, host: &str, new_ip: IpAddr) -> UpdateOutcome {
        let max_attempts = self.options.update_retries + 1;
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            match self.updater.update_record(host, new_ip).await {
                Ok(()) => {
                    info!(host = %host, ip = %new_ip, attempts = attempt, "IP address updated");
                    self.emit_event(RunEvent::HostUpdated {
                        host: host.to_string(),
                        attempts: attempt,
                    });
                    return UpdateOutcome {
                        host: host.to_string(),
                        attempts: attempt,
                        failure: None,
                    };
                }
                Err(e) => {
                    if attempt < max_attempts {
                        warn!(host = %host, attempt, error = %e, "Update attempt failed, retrying");
                    }
                    last_error = Some(e);
                }
            }
        }

        let error = last_error
            .unwrap_or_else(|| Error::api(host, "no update attempt was made"));
        error!(
            host = %host,
            provider = self.updater.provider_name(),
            attempts = max_attempts,
            error = %error,
            "Can't update the IP address"
        );
        self.emit_event(RunEvent::HostFailed {
            host: host.to_string(),
            error: error.to_string(),
            attempts: max_attempts,
        });
        UpdateOutcome {
            host: host.to_string(),
            attempts: max_attempts,
            failure: Some(error),
        }
    }

    /// Emit a run event
    fn emit_event(&self, event: RunEvent) {
        let Some(tx) = &self.event_tx else {
            return;
        };
        match tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!("Event channel full, dropping event {:?}", event);
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("Event receiver dropped");
            }
        }
    }
}
