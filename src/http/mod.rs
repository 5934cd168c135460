//! HTTP transport for page requests
//!
//! Retries, backoff and client-side throttling live here, never in the
//! pagination loop: a page fetch either returns a decoded body or the error
//! that remained after the retry budget was spent.

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, RetryPolicy};
pub use rate_limit::{RateLimiter, RateLimiterConfig};

#[cfg(test)]
mod tests;
