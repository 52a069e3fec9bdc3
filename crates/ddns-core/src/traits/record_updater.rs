// # Record Updater Trait
//
// Defines the interface for replacing one authoritative host's A-record
// through the provider REST API.
//
// ## Implementations
//
// - Gandi LiveDNS: `ddns-provider-gandi` crate

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for record updater implementations
///
/// Implementations hold the credential and the record URL template; the
/// orchestrator only supplies the host and the new address.
///
/// ## Allowed
/// - One authenticated HTTP request per call
/// - Mapping the provider's status codes onto [`crate::Error::Api`]
///
/// ## Forbidden
/// - Retrying or sleeping (retries are owned by the orchestrator and the scheduler)
/// - Touching the configuration store
/// - Deciding whether an update is needed
/// - Putting the credential in the URL or in any log line
///
/// ✅ **CORRECT**: single request, status decides the result
/// ```rust,ignore
/// async fn update_record(&self, host: &str, new_ip: IpAddr) -> Result<()> {
///     let response = self.client.put(self.record_url(host)).json(&body).send().await?;
///     if response.status() == StatusCode::CREATED {
///         Ok(())
///     } else {
///         Err(Error::api(host, response.status().to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait RecordUpdater: Send + Sync {
    /// Replace the A-record value of `host` with `new_ip`
    ///
    /// # Returns
    ///
    /// - `Ok(())`: the provider accepted the new value
    /// - `Err(Error::Api)`: any other status, transport error or timeout
    async fn update_record(&self, host: &str, new_ip: IpAddr) -> Result<(), crate::Error>;

    /// Provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
