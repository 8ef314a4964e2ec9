//! Adaptive per-host rate limiter.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use super::config::{HostStats, RateLimitConfig};

/// Internal state for a host.
#[derive(Debug)]
struct HostState {
    current_delay: Duration,
    /// When the most recently granted request may start.
    next_slot: Option<Instant>,
    consecutive_successes: u32,
    in_backoff: bool,
    total_requests: u64,
    rate_limit_hits: u64,
}

impl HostState {
    fn new(base_delay: Duration) -> Self {
        Self {
            current_delay: base_delay,
            next_slot: None,
            consecutive_successes: 0,
            in_backoff: false,
            total_requests: 0,
            rate_limit_hits: 0,
        }
    }

    fn stats(&self) -> HostStats {
        HostStats {
            current_delay: self.current_delay,
            in_backoff: self.in_backoff,
            total_requests: self.total_requests,
            rate_limit_hits: self.rate_limit_hits,
        }
    }
}

/// Adaptive rate limiter that tracks per-host request timing.
///
/// - Exponential backoff on rate limit responses (429, 503)
/// - Gradual recovery after consecutive successes
#[derive(Clone)]
pub struct RateLimiter {
    hosts: Arc<Mutex<HashMap<String, HostState>>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Create a new rate limiter with default config.
    pub fn new() -> Self {
        Self::with_config(RateLimitConfig::default())
    }

    /// Create a new rate limiter with custom config.
    pub fn with_config(config: RateLimitConfig) -> Self {
        Self {
            hosts: Arc::new(Mutex::new(HashMap::new())),
            config,
        }
    }

    /// Extract host from URL.
    pub fn extract_host(url: &str) -> Option<String> {
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|s| s.to_string()))
    }

    /// Reserve the next request slot for the host and wait until it opens.
    /// Returns the host name if the URL had one.
    pub async fn acquire(&self, url: &str) -> Option<String> {
        let host = Self::extract_host(url)?;

        let wait = {
            let mut hosts = self.hosts.lock().await;
            let state = hosts
                .entry(host.clone())
                .or_insert_with(|| HostState::new(self.config.base_delay));

            let now = Instant::now();
            let start = match state.next_slot {
                Some(slot) if slot > now => slot,
                _ => now,
            };
            state.next_slot = Some(start + state.current_delay);
            state.total_requests += 1;
            start - now
        };

        if wait > Duration::ZERO {
            debug!("Rate limiting {}: waiting {:?}", host, wait);
            tokio::time::sleep(wait).await;
        }
        Some(host)
    }

    /// Report a successful request - may decrease delay.
    pub async fn report_success(&self, host: &str) {
        let mut hosts = self.hosts.lock().await;
        let Some(state) = hosts.get_mut(host) else {
            return;
        };

        state.consecutive_successes += 1;

        // Recover from backoff after threshold successes
        if state.in_backoff && state.consecutive_successes >= self.config.recovery_threshold {
            let reduced = state.current_delay.mul_f64(self.config.recovery_multiplier);
            if reduced <= self.config.base_delay {
                state.in_backoff = false;
                state.current_delay = self.config.base_delay;
                info!("Host {} recovered from rate limit backoff", host);
            } else {
                state.current_delay = reduced;
                debug!("Host {} delay reduced to {:?}", host, state.current_delay);
            }
            state.consecutive_successes = 0;
        }
    }

    /// Report a rate limit hit (429 or 503) - increases delay.
    ///
    /// A `retry_after` from the server pushes the next slot out at least that far.
    pub async fn report_rate_limit(
        &self,
        host: &str,
        status_code: u16,
        retry_after: Option<Duration>,
    ) {
        let mut hosts = self.hosts.lock().await;
        let state = hosts
            .entry(host.to_string())
            .or_insert_with(|| HostState::new(self.config.base_delay));

        state.rate_limit_hits += 1;
        state.consecutive_successes = 0;
        state.in_backoff = true;
        state.current_delay = state
            .current_delay
            .mul_f64(self.config.backoff_multiplier)
            .min(self.config.max_delay);

        if let Some(retry_after) = retry_after {
            let earliest = Instant::now() + retry_after;
            if !matches!(state.next_slot, Some(slot) if slot >= earliest) {
                state.next_slot = Some(earliest);
            }
        }

        warn!(
            "Rate limited by {} (HTTP {}), backing off to {:?}",
            host, status_code, state.current_delay
        );
    }

    /// Get statistics for a host.
    pub async fn stats(&self, host: &str) -> Option<HostStats> {
        let hosts = self.hosts.lock().await;
        hosts.get(host).map(HostState::stats)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(base_ms: u64) -> RateLimiter {
        RateLimiter::with_config(RateLimitConfig {
            base_delay: Duration::from_millis(base_ms),
            max_delay: Duration::from_millis(base_ms * 8),
            recovery_threshold: 2,
            ..Default::default()
        })
    }

    #[test]
    fn test_extract_host() {
        assert_eq!(
            RateLimiter::extract_host("https://api.vam.ac.uk/v2/objects/search?q=x"),
            Some("api.vam.ac.uk".to_string())
        );
        assert_eq!(RateLimiter::extract_host("not a url"), None);
    }

    #[tokio::test]
    async fn test_first_acquire_is_immediate() {
        let limiter = limiter(200);
        let start = Instant::now();
        assert_eq!(
            limiter.acquire("https://example.com/a").await.as_deref(),
            Some("example.com")
        );
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_second_acquire_waits() {
        let limiter = limiter(50);
        limiter.acquire("https://example.com/a").await;
        let start = Instant::now();
        limiter.acquire("https://example.com/b").await;
        assert!(start.elapsed() >= Duration::from_millis(40));

        let stats = limiter.stats("example.com").await.unwrap();
        assert_eq!(stats.total_requests, 2);
    }

    #[tokio::test]
    async fn test_backoff_and_recovery() {
        let limiter = limiter(10);
        limiter.acquire("https://example.com/").await;

        limiter.report_rate_limit("example.com", 429, None).await;
        limiter.report_rate_limit("example.com", 429, None).await;
        limiter.report_rate_limit("example.com", 503, None).await;
        limiter.report_rate_limit("example.com", 503, None).await;

        let stats = limiter.stats("example.com").await.unwrap();
        assert!(stats.in_backoff);
        assert_eq!(stats.rate_limit_hits, 4);
        // Capped at max_delay
        assert_eq!(stats.current_delay, Duration::from_millis(80));

        for _ in 0..40 {
            limiter.report_success("example.com").await;
        }
        let stats = limiter.stats("example.com").await.unwrap();
        assert!(!stats.in_backoff);
        assert_eq!(stats.current_delay, Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_success_for_unknown_host_is_noop() {
        let limiter = limiter(10);
        limiter.report_success("nowhere.example").await;
        assert!(limiter.stats("nowhere.example").await.is_none());
    }
}
