// # Address Resolver Trait
//
// Defines the interface for turning the DDNS hostname into the network's
// current public address.
//
// ## Implementations
//
// - System resolver: `ddns-ip-resolver` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::AddressResolver;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let resolver = /* AddressResolver implementation */;
//
//     let ip = resolver.resolve("home.example-ddns.net").await?;
//     println!("current address: {}", ip);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for address resolver implementations
///
/// # Contract
///
/// - Uses whatever name resolution the host environment is configured with
/// - Returns a single address of the configured family
/// - Fails with [`crate::Error::Resolution`] on NXDOMAIN, timeout or network failure
/// - Never retries: the external scheduler re-running the updater is the retry
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Resolve `hostname` to its current address
    async fn resolve(&self, hostname: &str) -> Result<IpAddr, crate::Error>;

    /// Name of the resolution backend (for logging)
    fn resolver_name(&self) -> &'static str;
}
