//! Page transport
//!
//! One [`HttpClient`] serves every page request of a service client. A page
//! request is a GET of `base_url` joined with the endpoint path, carrying the
//! page's query parameters, and answered with a JSON body. Transient failures
//! are retried here, so the pager only ever sees a decoded body or a final
//! error.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::error::{Error, Result};
use crate::types::{BackoffType, StringMap};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

// ============================================================================
// Retry Policy
// ============================================================================

/// How often and how patiently a page request is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Growth of the delay between attempts
    pub backoff: BackoffType,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any single wait, including server-requested ones
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: BackoffType::Exponential,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(20),
        }
    }
}

impl RetryPolicy {
    /// Never retry
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Wait before retry number `attempt + 1`
    pub fn delay(&self, attempt: u32) -> Duration {
        let delay = match self.backoff {
            BackoffType::Constant => self.initial_delay,
            BackoffType::Linear => self.initial_delay.saturating_mul(attempt.saturating_add(1)),
            BackoffType::Exponential => self
                .initial_delay
                .saturating_mul(2u32.saturating_pow(attempt)),
        };
        delay.min(self.max_delay)
    }

    /// Wait after a throttling answer
    ///
    /// The server's `Retry-After` hint is honored up to `max_delay`.
    pub fn throttle_delay(&self, retry_after: Option<Duration>, attempt: u32) -> Duration {
        retry_after
            .map_or_else(|| self.delay(attempt), |hint| hint.min(self.max_delay))
    }
}

// ============================================================================
// Transport Config
// ============================================================================

/// Settings for an [`HttpClient`]
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// API root that endpoint paths are appended to
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retry schedule
    pub retry: RetryPolicy,
    /// Client-side throttle, `None` to send as fast as pages are asked for
    pub rate_limit: Option<RateLimiterConfig>,
    /// Headers sent with every request
    pub headers: StringMap,
    /// User agent string
    pub user_agent: String,
}

impl HttpClientConfig {
    /// Defaults for everything but the API root
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            rate_limit: Some(RateLimiterConfig::default()),
            headers: StringMap::new(),
            user_agent: format!("zonepager/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: Option<RateLimiterConfig>) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

// ============================================================================
// Client
// ============================================================================

/// Result of one attempt at a page request
enum Attempt {
    Success(Response),
    Transient { error: Error, delay: Duration },
    Fatal(Error),
}

/// HTTP transport for page requests
pub struct HttpClient {
    client: reqwest::Client,
    config: HttpClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Build the transport; fails on headers that are not valid HTTP
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .default_headers(header_map(&config.headers)?)
            .build()?;
        let rate_limiter = config.rate_limit.map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Whether requests are throttled client-side
    pub fn is_rate_limited(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Full URL of a page request
    pub fn page_url(&self, path: &str, query: &[(String, String)]) -> Url {
        let mut url = self.config.base_url.clone();
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    /// GET one page and decode its JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T> {
        let url = self.page_url(path, query);
        let retry = &self.config.retry;
        let mut attempt = 0;

        let response = loop {
            if let Some(limiter) = &self.rate_limiter {
                limiter.acquire().await;
            }

            match self.attempt(&url, attempt).await {
                Attempt::Success(response) => break response,
                Attempt::Transient { error, delay } if attempt < retry.max_retries => {
                    warn!(
                        %url,
                        error = %error,
                        attempt = attempt + 1,
                        of = retry.max_retries + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Page request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Attempt::Transient { error, .. } | Attempt::Fatal(error) => return Err(error),
            }
        };

        debug!(%url, attempts = attempt + 1, "Page request succeeded");
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| Error::decode(format!("invalid JSON from {path}: {e}")))
    }

    async fn attempt(&self, url: &Url, attempt: u32) -> Attempt {
        let retry = &self.config.retry;
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return Attempt::Transient {
                    error: Error::Timeout {
                        timeout_ms: self.config.timeout.as_millis() as u64,
                    },
                    delay: retry.delay(attempt),
                }
            }
            Err(e) if e.is_connect() => {
                return Attempt::Transient {
                    error: Error::Http(e),
                    delay: retry.delay(attempt),
                }
            }
            Err(e) => return Attempt::Fatal(Error::Http(e)),
        };

        let status = response.status();
        if status.is_success() {
            return Attempt::Success(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let hint = retry_after(&response);
            return Attempt::Transient {
                error: Error::RateLimited {
                    retry_after_seconds: hint.map_or(0, |d| d.as_secs()),
                },
                delay: retry.throttle_delay(hint, attempt),
            };
        }

        let body = response.text().await.unwrap_or_default();
        let error = Error::http_status(status.as_u16(), body);
        if error.is_retryable() {
            Attempt::Transient {
                error,
                delay: retry.delay(attempt),
            }
        } else {
            Attempt::Fatal(error)
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.config.base_url.as_str())
            .field("retry", &self.config.retry)
            .field("rate_limiter", &self.rate_limiter)
            .finish_non_exhaustive()
    }
}

/// Validate configured headers once, up front
fn header_map(headers: &StringMap) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (key, value) in headers {
        let invalid = |message: String| Error::invalid_value(format!("headers.{key}"), message);
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let mut value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        value.set_sensitive(name == reqwest::header::AUTHORIZATION);
        map.insert(name, value);
    }
    Ok(map)
}

/// `Retry-After` in seconds, if the server sent one
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
        .map(Duration::from_secs)
}
