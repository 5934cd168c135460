//! Configuration types for zonepager
//!
//! The client is configured from a small YAML document:
//!
//! ```yaml
//! base_url: https://dns.example.com/2013-04-01
//! headers:
//!   Authorization: Bearer 8f14e45fceea167a
//! http:
//!   timeout_seconds: 30
//!   max_retries: 3
//!   backoff:
//!     type: exponential
//!     initial_ms: 100
//!     max_ms: 20000
//!   rate_limit:
//!     enabled: true
//!     requests_per_second: 5
//!     burst: 5
//! endpoints:
//!   objects:
//!     server_page_cap: 500
//! log_level: info
//! ```

use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig, RetryPolicy};
use crate::service::{EndpointOverride, EndpointRegistry, ListOperation};
use crate::types::{BackoffType, LogLevel, StringMap};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

// ============================================================================
// Client Config
// ============================================================================

/// Top-level client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL of the administration API
    pub base_url: String,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: StringMap,

    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Per-operation endpoint overrides
    #[serde(default)]
    pub endpoints: HashMap<ListOperation, EndpointOverride>,

    /// Default log level
    #[serde(default)]
    pub log_level: LogLevel,
}

impl ClientConfig {
    /// Configuration with defaults for everything but the base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            headers: StringMap::new(),
            http: HttpConfig::default(),
            endpoints: HashMap::new(),
            log_level: LogLevel::default(),
        }
    }

    /// Parse configuration from YAML text
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        debug!(path = %path.display(), "Loading configuration");
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::missing_field("base_url"));
        }
        let url = url::Url::parse(&self.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::invalid_value(
                "base_url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        self.http.validate()?;
        self.registry()?;
        Ok(())
    }

    /// Endpoint registry with this configuration's overrides applied
    pub fn registry(&self) -> Result<EndpointRegistry> {
        EndpointRegistry::builtin().with_overrides(&self.endpoints)
    }

    /// Build HTTP transport settings
    pub fn to_http_config(&self) -> Result<HttpClientConfig> {
        let retry = RetryPolicy {
            max_retries: self.http.max_retries,
            backoff: self.http.backoff.backoff_type,
            initial_delay: Duration::from_millis(self.http.backoff.initial_ms),
            max_delay: Duration::from_millis(self.http.backoff.max_ms),
        };
        let rate_limit = if self.http.rate_limit.enabled {
            Some(RateLimiterConfig::new(
                self.http.rate_limit.requests_per_second,
                self.http.rate_limit.burst,
            )?)
        } else {
            None
        };

        let mut config = HttpClientConfig::new(&self.base_url)?
            .with_timeout(Duration::from_secs(self.http.timeout_seconds))
            .with_retry(retry)
            .with_rate_limit(rate_limit);
        config.headers.clone_from(&self.headers);
        Ok(config)
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP transport configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum number of retries per request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff configuration
    #[serde(default)]
    pub backoff: BackoffConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            backoff: BackoffConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl HttpConfig {
    fn validate(&self) -> Result<()> {
        if self.timeout_seconds == 0 {
            return Err(Error::invalid_value(
                "http.timeout_seconds",
                "must be greater than zero",
            ));
        }
        if self.backoff.initial_ms > self.backoff.max_ms {
            return Err(Error::invalid_value(
                "http.backoff.initial_ms",
                "must not exceed max_ms",
            ));
        }
        if self.rate_limit.enabled {
            RateLimiterConfig::new(self.rate_limit.requests_per_second, self.rate_limit.burst)?;
        }
        Ok(())
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

/// Backoff configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackoffConfig {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_initial_ms() -> u64 {
    100
}

fn default_max_ms() -> u64 {
    20_000
}

/// Client-side rate limiting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    /// Whether to throttle requests
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Requests per second limit
    #[serde(default = "default_rps")]
    pub requests_per_second: u32,

    /// Requests allowed in a burst
    #[serde(default = "default_burst")]
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            requests_per_second: default_rps(),
            burst: default_burst(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_rps() -> u32 {
    5
}

fn default_burst() -> u32 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const FULL: &str = r"
base_url: https://dns.example.com/2013-04-01
headers:
  Authorization: Bearer test
http:
  timeout_seconds: 10
  max_retries: 1
  backoff:
    type: linear
    initial_ms: 50
    max_ms: 500
  rate_limit:
    enabled: false
endpoints:
  objects:
    server_page_cap: 500
  health-checks:
    items_field: Checks
log_level: debug
";

    #[test]
    fn test_minimal_config_defaults() {
        let config = ClientConfig::from_yaml_str("base_url: http://localhost:8080").unwrap();

        assert_eq!(config.http, HttpConfig::default());
        assert_eq!(config.http.timeout_seconds, 30);
        assert_eq!(config.http.backoff.backoff_type, BackoffType::Exponential);
        assert!(config.http.rate_limit.enabled);
        assert!(config.endpoints.is_empty());
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_full_config() {
        let config = ClientConfig::from_yaml_str(FULL).unwrap();

        assert_eq!(config.http.max_retries, 1);
        assert_eq!(config.http.backoff.backoff_type, BackoffType::Linear);
        assert!(!config.http.rate_limit.enabled);
        assert_eq!(config.log_level, LogLevel::Debug);

        let registry = config.registry().unwrap();
        assert_eq!(registry.get(ListOperation::Objects).server_page_cap, 500);
        assert_eq!(registry.get(ListOperation::HealthChecks).items_field, "Checks");
        assert_eq!(registry.get(ListOperation::HostedZones).server_page_cap, 100);
    }

    #[test]
    fn test_to_http_config() {
        let config = ClientConfig::from_yaml_str(FULL).unwrap();
        let http = config.to_http_config().unwrap();

        assert_eq!(http.base_url.as_str(), "https://dns.example.com/2013-04-01");
        assert_eq!(http.timeout, Duration::from_secs(10));
        assert_eq!(
            http.retry,
            RetryPolicy {
                max_retries: 1,
                backoff: BackoffType::Linear,
                initial_delay: Duration::from_millis(50),
                max_delay: Duration::from_millis(500),
            }
        );
        assert!(http.rate_limit.is_none());
        assert_eq!(
            http.headers.get("Authorization"),
            Some(&"Bearer test".to_string())
        );
    }

    #[test]
    fn test_to_http_config_rate_limit() {
        let config = ClientConfig::new("http://localhost:8080");
        let http = config.to_http_config().unwrap();
        let rate = http.rate_limit.unwrap();

        assert_eq!(rate.requests_per_second.get(), 5);
        assert_eq!(rate.burst.get(), 5);
    }

    #[test]
    fn test_rejects_zero_burst() {
        let yaml = "base_url: http://localhost\nhttp:\n  rate_limit:\n    burst: 0\n";
        let err = ClientConfig::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("http.rate_limit.burst"));
    }

    #[test]
    fn test_header_values_are_literal() {
        let yaml = "base_url: http://localhost\nheaders:\n  Authorization: Bearer ${TOKEN}\n";
        let http = ClientConfig::from_yaml_str(yaml)
            .unwrap()
            .to_http_config()
            .unwrap();
        assert_eq!(
            http.headers.get("Authorization"),
            Some(&"Bearer ${TOKEN}".to_string())
        );
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(matches!(
            ClientConfig::from_yaml_str("base_url: ''"),
            Err(Error::MissingConfigField { .. })
        ));
        assert!(matches!(
            ClientConfig::from_yaml_str("base_url: not a url"),
            Err(Error::InvalidUrl(_))
        ));
        assert!(matches!(
            ClientConfig::from_yaml_str("base_url: ftp://example.com"),
            Err(Error::InvalidConfigValue { .. })
        ));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let yaml = "base_url: http://localhost\nretries: 3\n";
        assert!(matches!(
            ClientConfig::from_yaml_str(yaml),
            Err(Error::YamlParse(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_operation() {
        let yaml = "base_url: http://localhost\nendpoints:\n  record-sets:\n    server_page_cap: 10\n";
        assert!(ClientConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_rejects_zero_page_cap() {
        let yaml = "base_url: http://localhost\nendpoints:\n  objects:\n    server_page_cap: 0\n";
        let err = ClientConfig::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("endpoints.objects.server_page_cap"));
    }

    #[test]
    fn test_rejects_inverted_backoff() {
        let yaml = "base_url: http://localhost\nhttp:\n  backoff:\n    initial_ms: 1000\n    max_ms: 10\n";
        let err = ClientConfig::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("http.backoff.initial_ms"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();

        let config = ClientConfig::load(file.path()).unwrap();
        assert_eq!(config.base_url, "https://dns.example.com/2013-04-01");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientConfig::load(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
