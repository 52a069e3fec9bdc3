// # Gandi LiveDNS Record Updater
//
// This crate provides the RecordUpdater for the Gandi LiveDNS REST API.
//
// ## Behavior
//
// - One `PUT` per host per attempt, replacing the whole A-record value set
// - Success is exactly `201 Created`; anything else is an `Error::Api`
// - Retries belong to the orchestrator and the external scheduler
//
// ## Trust Level: Untrusted (Record Updater)
//
// **Allowed Capabilities**:
// - ✅ HTTP/HTTPS calls to the configured record URL only
// - ✅ Classifying provider status codes
//
// **Forbidden Capabilities**:
// - ❌ Retrying, sleeping or spawning tasks
// - ❌ Touching the configuration store
// - ❌ Logging the API key or placing it in a URL
//
// ## API Reference
//
// - LiveDNS: https://api.gandi.net/docs/livedns/
// - Replace record: PUT `/v5/livedns/domains/:fqdn/records/:name/:type`
//   with body `{"rrset_values": [...], "rrset_ttl": ...}`

use async_trait::async_trait;
use ddns_core::config::GandiConfig;
use ddns_core::traits::RecordUpdater;
use ddns_core::{Error, HOST_PLACEHOLDER, Result};
use reqwest::StatusCode;
use serde::Serialize;
use std::net::IpAddr;
use std::time::Duration;

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Request body replacing the record's value set
#[derive(Debug, Serialize)]
struct RrsetReplace {
    rrset_values: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    rrset_ttl: Option<u32>,
}

/// Gandi LiveDNS record updater
///
/// # Security
///
/// The Debug implementation does NOT expose the API key.
pub struct GandiUpdater {
    /// LiveDNS API key
    /// ⚠️ NEVER log this value
    api_key: String,

    /// Authorization scheme ("Apikey", or "Bearer" for personal access tokens)
    auth_scheme: String,

    /// Record URL with a single `{host}` placeholder
    record_url_template: String,

    /// TTL sent with every replacement (provider default when None)
    ttl: Option<u32>,

    /// HTTP client for API requests
    client: reqwest::Client,
}

impl std::fmt::Debug for GandiUpdater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GandiUpdater")
            .field("api_key", &"<REDACTED>")
            .field("auth_scheme", &self.auth_scheme)
            .field("record_url_template", &self.record_url_template)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl GandiUpdater {
    /// Create a new Gandi updater
    ///
    /// # Parameters
    ///
    /// - `api_key`: LiveDNS API key
    /// - `auth_scheme`: scheme placed before the key in the `Authorization` header
    /// - `record_url_template`: record URL containing exactly one `{host}`
    /// - `ttl`: optional TTL for the replaced record
    /// - `timeout`: HTTP timeout per request
    ///
    /// # Errors
    ///
    /// `Error::Config` for an empty key or a template without exactly one
    /// placeholder, or when the HTTP client cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        auth_scheme: impl Into<String>,
        record_url_template: impl Into<String>,
        ttl: Option<u32>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Error::config("Gandi API key cannot be empty"));
        }

        let record_url_template = record_url_template.into();
        if record_url_template.matches(HOST_PLACEHOLDER).count() != 1 {
            return Err(Error::config(format!(
                "record URL template must contain exactly one {} placeholder",
                HOST_PLACEHOLDER
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            auth_scheme: auth_scheme.into(),
            record_url_template,
            ttl,
            client,
        })
    }

    /// Create from the `[gandi]` configuration section
    pub fn from_config(config: &GandiConfig) -> Result<Self> {
        let timeout = if config.timeout_secs == 0 {
            DEFAULT_HTTP_TIMEOUT
        } else {
            Duration::from_secs(config.timeout_secs)
        };

        Self::new(
            config.api_key.clone(),
            config.auth_scheme.clone(),
            config.record_url_template.clone(),
            config.ttl,
            timeout,
        )
    }

    /// Record URL for one authoritative host
    pub fn record_url(&self, host: &str) -> String {
        self.record_url_template.replace(HOST_PLACEHOLDER, host)
    }
}

/// Human-readable classification of a rejected replacement
fn classify_status(status: StatusCode) -> &'static str {
    match status.as_u16() {
        401 | 403 => "authentication failed: invalid API key or insufficient permissions",
        404 => "domain or record not found at the provider",
        409 => "conflict: record is being modified concurrently",
        429 => "rate limit exceeded",
        500..=599 => "provider server error (transient)",
        _ => "unexpected response",
    }
}

#[async_trait]
impl RecordUpdater for GandiUpdater {
    async fn update_record(&self, host: &str, new_ip: IpAddr) -> Result<()> {
        let url = self.record_url(host);
        let body = RrsetReplace {
            rrset_values: vec![new_ip.to_string()],
            rrset_ttl: self.ttl,
        };

        tracing::debug!(host = %host, url = %url, ip = %new_ip, "Replacing record");

        let response = self
            .client
            .put(&url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("{} {}", self.auth_scheme, self.api_key),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::api(host, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::CREATED {
            tracing::debug!(host = %host, status = %status, "Record replaced");
            return Ok(());
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        let error_text = error_text.trim();

        let detail = if error_text.is_empty() {
            format!("{} ({})", classify_status(status), status)
        } else {
            format!("{} ({}): {}", classify_status(status), status, error_text)
        };

        Err(Error::api(host, detail))
    }

    fn provider_name(&self) -> &'static str {
        "gandi"
    }
}
