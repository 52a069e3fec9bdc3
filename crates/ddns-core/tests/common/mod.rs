//! Test doubles and common utilities for run contract tests
//!
//! This module provides minimal test doubles that record how the
//! orchestrator drives its collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use ddns_core::error::{Error, Result};
use ddns_core::traits::{AddressResolver, ConfigStore, RecordUpdater};
use ddns_core::{MemoryConfigStore, UpdaterConfig};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A resolver that always returns the same address
#[derive(Clone)]
pub struct StaticResolver {
    ip: IpAddr,
    call_count: Arc<AtomicUsize>,
}

impl StaticResolver {
    pub fn new(ip: &str) -> Self {
        Self {
            ip: ip.parse().expect("valid test ip"),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AddressResolver for StaticResolver {
    async fn resolve(&self, _hostname: &str) -> Result<IpAddr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.ip)
    }

    fn resolver_name(&self) -> &'static str {
        "static"
    }
}

/// A resolver that always fails, like a lookup that timed out
pub struct FailingResolver {
    cause: &'static str,
}

impl FailingResolver {
    pub fn timing_out() -> Self {
        Self {
            cause: "timed out after 10s",
        }
    }
}

#[async_trait]
impl AddressResolver for FailingResolver {
    async fn resolve(&self, hostname: &str) -> Result<IpAddr> {
        Err(Error::resolution(hostname, self.cause))
    }

    fn resolver_name(&self) -> &'static str {
        "failing"
    }
}

/// An updater whose per-host replies are scripted
///
/// Hosts without a script succeed. A script is consumed one reply per
/// call; once exhausted the host succeeds.
#[derive(Clone, Default)]
pub struct ScriptedUpdater {
    calls: Arc<Mutex<Vec<(String, IpAddr)>>>,
    scripts: Arc<Mutex<HashMap<String, Vec<Option<u16>>>>>,
}

impl ScriptedUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call for `host` fails with `status`
    pub fn failing(self, host: &str, status: u16) -> Self {
        self.scripted(host, vec![Some(status); 16])
    }

    /// Replies for `host` in call order; `Some(status)` fails, `None` succeeds
    pub fn scripted(self, host: &str, replies: Vec<Option<u16>>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(host.to_string(), replies.into_iter().rev().collect());
        self
    }

    /// Hosts in the order they were called
    pub fn called_hosts(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(host, _)| host.clone())
            .collect()
    }

    pub fn calls(&self) -> Vec<(String, IpAddr)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl RecordUpdater for ScriptedUpdater {
    async fn update_record(&self, host: &str, new_ip: IpAddr) -> Result<()> {
        self.calls.lock().unwrap().push((host.to_string(), new_ip));

        let reply = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(host)
            .and_then(|replies| replies.pop())
            .flatten();

        match reply {
            Some(status) => Err(Error::api(host, format!("HTTP {}", status))),
            None => Ok(()),
        }
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

/// A store whose persistence always fails
pub struct FailingPersistStore {
    inner: MemoryConfigStore,
    pub persist_attempts: usize,
}

impl FailingPersistStore {
    pub fn new(config: UpdaterConfig) -> Self {
        Self {
            inner: MemoryConfigStore::new(config).expect("valid test config"),
            persist_attempts: 0,
        }
    }
}

#[async_trait]
impl ConfigStore for FailingPersistStore {
    fn config(&self) -> &UpdaterConfig {
        self.inner.config()
    }

    async fn set_last_known_ip(&mut self, _ip: &str) -> Result<()> {
        self.persist_attempts += 1;
        Err(Error::persist("No space left on device"))
    }
}

/// Helper to create a valid configuration for testing
pub fn test_config(last_known_ip: &str, hosts: &[&str]) -> UpdaterConfig {
    let hosts = hosts
        .iter()
        .map(|host| format!("\"{}\"", host))
        .collect::<Vec<_>>()
        .join(", ");

    UpdaterConfig::from_toml_str(&format!(
        r#"
[general]
version = 1
ddns_hostname = "home.example-ddns.net"
ip = "{}"

[gandi]
api_key = "test-key"
record_url_template = "https://api.gandi.net/v5/livedns/domains/{{host}}/records/%40/A"
hosts = [{}]
"#,
        last_known_ip, hosts
    ))
    .expect("valid test config")
}

/// Helper to create a memory store for testing
pub fn memory_store(last_known_ip: &str, hosts: &[&str]) -> MemoryConfigStore {
    MemoryConfigStore::new(test_config(last_known_ip, hosts)).expect("valid test config")
}
