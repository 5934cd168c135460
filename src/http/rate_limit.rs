//! Client-side request throttle
//!
//! The provider meters administrative calls per account. Every page request of
//! one client draws from a single token bucket, so a long listing paces itself
//! instead of collecting throttling answers.

use crate::error::{Error, Result};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter as Governor};
use std::num::NonZeroU32;
use std::sync::Arc;

const DEFAULT_RATE: NonZeroU32 = NonZeroU32::MIN.saturating_add(4);

/// Request rate allowed by a [`RateLimiter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Sustained page requests per second
    pub requests_per_second: NonZeroU32,
    /// Requests that may be sent back to back
    pub burst: NonZeroU32,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            requests_per_second: DEFAULT_RATE,
            burst: DEFAULT_RATE,
        }
    }
}

impl RateLimiterConfig {
    /// Rate from plain numbers; both must be non-zero
    pub fn new(requests_per_second: u32, burst: u32) -> Result<Self> {
        let non_zero = |field: &str, value: u32| {
            NonZeroU32::new(value)
                .ok_or_else(|| Error::invalid_value(field, "must be greater than zero"))
        };
        let requests_per_second =
            non_zero("http.rate_limit.requests_per_second", requests_per_second)?;
        let burst = non_zero("http.rate_limit.burst", burst)?;
        Ok(Self {
            requests_per_second,
            burst,
        })
    }

    fn quota(self) -> Quota {
        Quota::per_second(self.requests_per_second).allow_burst(self.burst)
    }
}

/// Token bucket shared by all clones
#[derive(Clone)]
pub struct RateLimiter {
    bucket: Arc<DefaultDirectRateLimiter>,
    config: RateLimiterConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            bucket: Arc::new(Governor::direct(config.quota())),
            config,
        }
    }

    /// Rate this limiter enforces
    pub fn config(&self) -> RateLimiterConfig {
        self.config
    }

    /// Wait for a permit to send one page request
    pub async fn acquire(&self) {
        self.bucket.until_ready().await;
    }

    /// Take a permit if one is free right now
    pub fn try_acquire(&self) -> bool {
        self.bucket.check().is_ok()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("requests_per_second", &self.config.requests_per_second)
            .field("burst", &self.config.burst)
            .finish()
    }
}
