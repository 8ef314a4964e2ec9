//! Rate limiting for museum API requests.
//!
//! Adaptive per-host spacing: a base delay between requests, exponential
//! backoff on rate limit responses, and gradual recovery afterwards.

mod config;
mod limiter;

pub use config::{HostStats, RateLimitConfig};
pub use limiter::RateLimiter;

use std::time::Duration;

/// Parse Retry-After header value (seconds).
/// Returns duration to wait, or None if header is missing/invalid.
pub fn parse_retry_after(header_value: Option<&str>) -> Option<Duration> {
    let value = header_value?;
    value
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| Duration::from_secs(secs.min(60)))
}
