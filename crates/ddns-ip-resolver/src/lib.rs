// # System Resolver
//
// This crate provides the AddressResolver backed by the host's own name
// resolution.
//
// ## Purpose
//
// The network's public address is only discoverable through a dynamic DNS
// hostname kept up to date by a third-party provider. Resolving that name
// with whatever resolver the machine is configured with (`/etc/hosts`,
// `/etc/resolv.conf`, nsswitch, ...) yields the current address.
//
// ## Architecture
//
// Lookups go through `tokio::net::lookup_host`, i.e. the platform's
// `getaddrinfo`, bounded by a timeout. No DNS server is hardcoded and no
// retry is attempted: a failed lookup ends the run and the scheduler's next
// invocation tries again.

use async_trait::async_trait;
use ddns_core::config::{IpVersion, ResolverConfig};
use ddns_core::traits::AddressResolver;
use ddns_core::{Error, Result};

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Default resolution timeout
const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolver using the executing machine's standard name resolution
#[derive(Debug, Clone)]
pub struct SystemResolver {
    /// Address family to return
    version: IpVersion,

    /// Upper bound for one lookup
    timeout: Duration,
}

impl SystemResolver {
    /// Create a new system resolver
    pub fn new(version: IpVersion, timeout: Duration) -> Self {
        Self { version, timeout }
    }

    /// Create from the `[resolver]` configuration section
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(config.ip_version, Duration::from_secs(config.timeout_secs))
    }
}

impl Default for SystemResolver {
    fn default() -> Self {
        Self::new(IpVersion::V4, DEFAULT_RESOLVE_TIMEOUT)
    }
}

#[async_trait]
impl AddressResolver for SystemResolver {
    async fn resolve(&self, hostname: &str) -> Result<IpAddr> {
        tracing::debug!(
            hostname = %hostname,
            version = ?self.version,
            timeout = ?self.timeout,
            "Resolving"
        );

        // Port is irrelevant, getaddrinfo only needs a service to pair with.
        let lookup = tokio::net::lookup_host((hostname, 0));
        let addrs = match tokio::time::timeout(self.timeout, lookup).await {
            Ok(Ok(addrs)) => addrs,
            Ok(Err(e)) => return Err(Error::resolution(hostname, e.to_string())),
            Err(_) => {
                return Err(Error::resolution(
                    hostname,
                    format!("timed out after {:?}", self.timeout),
                ));
            }
        };

        select_address(addrs, self.version).ok_or_else(|| {
            Error::resolution(
                hostname,
                match self.version {
                    IpVersion::V4 => "no IPv4 address",
                    IpVersion::V6 => "no IPv6 address",
                },
            )
        })
    }

    fn resolver_name(&self) -> &'static str {
        "system"
    }
}

/// First address of the requested family, in resolver order
fn select_address(
    addrs: impl IntoIterator<Item = SocketAddr>,
    version: IpVersion,
) -> Option<IpAddr> {
    addrs
        .into_iter()
        .map(|addr| addr.ip())
        .find(|ip| match version {
            IpVersion::V4 => ip.is_ipv4(),
            IpVersion::V6 => ip.is_ipv6(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addrs(ips: &[&str]) -> Vec<SocketAddr> {
        ips.iter()
            .map(|ip| SocketAddr::new(ip.parse().unwrap(), 0))
            .collect()
    }

    #[test]
    fn test_select_first_of_family() {
        let mixed = addrs(&["2001:db8::1", "203.0.113.5", "203.0.113.6"]);

        assert_eq!(
            select_address(mixed.clone(), IpVersion::V4),
            Some("203.0.113.5".parse().unwrap())
        );
        assert_eq!(
            select_address(mixed, IpVersion::V6),
            Some("2001:db8::1".parse().unwrap())
        );
    }

    #[test]
    fn test_select_none_of_family() {
        assert_eq!(select_address(addrs(&["2001:db8::1"]), IpVersion::V4), None);
        assert_eq!(select_address(Vec::new(), IpVersion::V6), None);
    }

    #[tokio::test]
    async fn test_ip_literal_resolves_to_itself() {
        let resolver = SystemResolver::default();
        let ip = resolver.resolve("203.0.113.5").await.unwrap();
        assert_eq!(ip, "203.0.113.5".parse::<IpAddr>().unwrap());
    }

    #[tokio::test]
    async fn test_wrong_family_literal_fails() {
        let resolver = SystemResolver::new(IpVersion::V6, DEFAULT_RESOLVE_TIMEOUT);
        let err = resolver.resolve("203.0.113.5").await.unwrap_err();
        match err {
            Error::Resolution { hostname, cause } => {
                assert_eq!(hostname, "203.0.113.5");
                assert_eq!(cause, "no IPv6 address");
            }
            other => panic!("expected resolution error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_name_fails() {
        // RFC 6761: .invalid never resolves
        let resolver = SystemResolver::default();
        let err = resolver.resolve("ddns-updater.invalid").await.unwrap_err();
        assert!(matches!(err, Error::Resolution { .. }));
    }

    #[test]
    fn test_from_config() {
        let config = ResolverConfig {
            ip_version: IpVersion::V6,
            timeout_secs: 3,
        };
        let resolver = SystemResolver::from_config(&config);
        assert_eq!(resolver.version, IpVersion::V6);
        assert_eq!(resolver.timeout, Duration::from_secs(3));
        assert_eq!(resolver.resolver_name(), "system");
    }
}
