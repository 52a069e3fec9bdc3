//! Configuration types for the updater
//!
//! The configuration file is also the updater's only persistent state: the
//! `[general] ip` field holds the last address that was propagated to every
//! configured host. Only [`crate::ConfigStore`] implementations write it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Configuration format version understood by this build
pub const CONFIG_VERSION: u32 = 1;

/// Placeholder substituted with the host name in `record_url_template`
pub const HOST_PLACEHOLDER: &str = "{host}";

/// Values written by the skeleton that must be replaced by the operator
const PLACEHOLDERS: &[&str] = &["DYNAMIC_DNS_HOST", "YOUR_GANDI_API_KEY", "YOUR_HOST"];

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Template written on first run when no configuration file exists
pub const SKELETON: &str = r#"# DNS updater configuration
#
# Replace every placeholder marked "Mandatory" and run the updater again.

[general]
version = 1
# Mandatory: the dynamic DNS name kept up to date by your router or box.
ddns_hostname = "DYNAMIC_DNS_HOST"
# Last address propagated to every host. Managed by the updater, leave empty.
ip = ""

[logging]
level = "info"
# file = "dns_updater.log"

[resolver]
ip_version = "v4"
timeout_secs = 10

[gandi]
# Mandatory: LiveDNS API key (use auth_scheme = "Bearer" for a personal access token).
api_key = "YOUR_GANDI_API_KEY"
auth_scheme = "Apikey"
record_url_template = "https://api.gandi.net/v5/livedns/domains/{host}/records/%40/A"
# Mandatory: domains whose A-record is replaced.
hosts = ["YOUR_HOST"]
# ttl = 300
timeout_secs = 30

[engine]
update_retries = 0
"#;

/// Main updater configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdaterConfig {
    /// DDNS hostname and persisted state
    pub general: GeneralConfig,

    /// Log level and optional log file
    #[serde(default)]
    pub logging: LoggingConfig,

    /// System resolution settings
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// LiveDNS API settings and the hosts to update
    pub gandi: GandiConfig,

    /// Optional run settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl UpdaterConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The last address propagated to every host (empty before the first success)
    pub fn last_known_ip(&self) -> &str {
        &self.general.ip
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.general.version != CONFIG_VERSION {
            return Err(Error::config(format!(
                "configuration file is for version {} but this updater reads version {}. \
                 Rename the old file and run again to get a new template.",
                self.general.version, CONFIG_VERSION
            )));
        }

        require("general.ddns_hostname", &self.general.ddns_hostname)?;
        // An IP literal resolves to itself
        if self.general.ddns_hostname.parse::<IpAddr>().is_err() {
            validate_domain_name("general.ddns_hostname", &self.general.ddns_hostname)?;
        }

        self.logging.validate()?;
        self.resolver.validate()?;
        self.gandi.validate()?;
        self.engine.validate()?;

        Ok(())
    }
}

/// `[general]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Configuration format version
    pub version: u32,

    /// Dynamic DNS name resolved on every run
    pub ddns_hostname: String,

    /// Last known IP
    #[serde(default)]
    pub ip: String,

    /// When `ip` was last written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_updated_at: Option<DateTime<Utc>>,
}

/// `[logging]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (overridden by `--log-level` and `RUST_LOG`)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Optional log file, relative paths resolve against the configuration directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    fn validate(&self) -> Result<()> {
        validate_log_level(&self.level)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Check a log level name
pub fn validate_log_level(level: &str) -> Result<()> {
    if !LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
        return Err(Error::config(format!(
            "log level '{}' is not valid. Valid levels: {}",
            level,
            LOG_LEVELS.join(", ")
        )));
    }
    Ok(())
}

/// `[resolver]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Address family to resolve
    #[serde(default = "default_ip_version")]
    pub ip_version: IpVersion,

    /// Resolution timeout (in seconds)
    #[serde(default = "default_resolve_timeout_secs")]
    pub timeout_secs: u64,
}

impl ResolverConfig {
    fn validate(&self) -> Result<()> {
        validate_range("resolver.timeout_secs", self.timeout_secs, 1, 300)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            ip_version: default_ip_version(),
            timeout_secs: default_resolve_timeout_secs(),
        }
    }
}

/// IP version to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    /// IPv4 only (A-records)
    V4,
    /// IPv6 only (AAAA-records)
    V6,
}

/// `[gandi]` section
#[derive(Clone, Serialize, Deserialize)]
pub struct GandiConfig {
    /// LiveDNS API key
    pub api_key: String,

    /// Scheme placed before the key in the Authorization header
    #[serde(default = "default_auth_scheme")]
    pub auth_scheme: String,

    /// Record URL with a single `{host}` placeholder
    pub record_url_template: String,

    /// Authoritative hosts, updated in this order
    pub hosts: Vec<String>,

    /// TTL sent with the record; the provider default applies when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,

    /// HTTP timeout per request (in seconds)
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

// The key must never reach a log line.
impl std::fmt::Debug for GandiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GandiConfig")
            .field("api_key", &"<REDACTED>")
            .field("auth_scheme", &self.auth_scheme)
            .field("record_url_template", &self.record_url_template)
            .field("hosts", &self.hosts)
            .field("ttl", &self.ttl)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl GandiConfig {
    fn validate(&self) -> Result<()> {
        require("gandi.api_key", &self.api_key)?;
        require("gandi.auth_scheme", &self.auth_scheme)?;
        if self.auth_scheme.chars().any(char::is_whitespace) {
            return Err(Error::config("gandi.auth_scheme cannot contain whitespace"));
        }

        require("gandi.record_url_template", &self.record_url_template)?;
        let placeholders = self.record_url_template.matches(HOST_PLACEHOLDER).count();
        if placeholders != 1 {
            return Err(Error::config(format!(
                "gandi.record_url_template must contain exactly one {} placeholder, found {}",
                HOST_PLACEHOLDER, placeholders
            )));
        }
        if !self.record_url_template.starts_with("https://")
            && !self.record_url_template.starts_with("http://")
        {
            return Err(Error::config(format!(
                "gandi.record_url_template must use HTTP or HTTPS scheme. Got: {}",
                self.record_url_template
            )));
        }

        if self.hosts.is_empty() {
            return Err(Error::config("gandi.hosts must contain at least one host"));
        }
        for host in &self.hosts {
            if host.chars().any(char::is_whitespace) {
                return Err(Error::config(format!(
                    "gandi.hosts entry '{}' contains whitespace",
                    host
                )));
            }
            require("gandi.hosts", host)?;
            validate_domain_name("gandi.hosts", host)?;
        }

        if self.ttl == Some(0) {
            return Err(Error::config("gandi.ttl must be greater than 0"));
        }

        validate_range("gandi.timeout_secs", self.timeout_secs, 1, 300)
    }
}

/// `[engine]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Extra immediate attempts for a host whose update failed
    ///
    /// The scheduler re-running the updater is the primary retry mechanism;
    /// leave at 0 unless a provider is known to fail transiently.
    #[serde(default)]
    pub update_retries: usize,
}

impl EngineConfig {
    fn validate(&self) -> Result<()> {
        validate_range("engine.update_retries", self.update_retries as u64, 0, 5)
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::config(format!("empty setting for {}", field)));
    }
    if PLACEHOLDERS.contains(&value) {
        return Err(Error::config(format!(
            "{} still holds the placeholder '{}'",
            field, value
        )));
    }
    Ok(())
}

fn validate_range(field: &str, value: u64, min: u64, max: u64) -> Result<()> {
    if !(min..=max).contains(&value) {
        return Err(Error::config(format!(
            "{} must be between {} and {}. Got: {}",
            field, min, max, value
        )));
    }
    Ok(())
}

/// Validate that a string is a valid domain name
///
/// Basic RFC 1035 checks: total length, label length and characters.
pub fn validate_domain_name(field: &str, domain: &str) -> Result<()> {
    if domain.is_empty() {
        return Err(Error::config(format!("{}: domain name cannot be empty", field)));
    }

    if domain.len() > 253 {
        return Err(Error::config(format!(
            "{}: domain name too long: {} chars (max 253). Got: {}",
            field,
            domain.len(),
            domain
        )));
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return Err(Error::config(format!(
                "{}: domain name has empty label: '{}'",
                field, domain
            )));
        }

        if label.len() > 63 {
            return Err(Error::config(format!(
                "{}: domain label too long: {} chars (max 63). Label: '{}'",
                field,
                label.len(),
                label
            )));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(Error::config(format!(
                "{}: domain label contains invalid characters. Label: '{}'. \
                 Valid: alphanumeric and hyphen only.",
                field, label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(Error::config(format!(
                "{}: domain label cannot start or end with hyphen. Label: '{}'",
                field, label
            )));
        }
    }

    Ok(())
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ip_version() -> IpVersion {
    IpVersion::V4
}

fn default_resolve_timeout_secs() -> u64 {
    10
}

fn default_auth_scheme() -> String {
    "Apikey".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}
