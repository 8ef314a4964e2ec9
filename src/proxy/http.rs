//! HTTP request proxy.
//!
//! Translates normalized search parameters into a backend query string,
//! spaces requests through the rate limiter, and decodes the JSON payload.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{ApiEndpoint, ProxyError, RequestProxy};
use crate::models::{RawSearchResult, SearchParams};
use crate::rate_limit::{parse_retry_after, RateLimitConfig, RateLimiter};

/// Default user agent.
pub const USER_AGENT: &str = concat!("curio/", env!("CARGO_PKG_VERSION"));

/// Request proxy that calls a museum search API over HTTPS.
#[derive(Clone)]
pub struct HttpRequestProxy {
    client: Client,
    endpoint: ApiEndpoint,
    rate_limiter: RateLimiter,
}

/// Builder for constructing `HttpRequestProxy` with optional configuration.
pub struct HttpRequestProxyBuilder {
    endpoint: ApiEndpoint,
    timeout: Duration,
    request_delay: Duration,
    user_agent: Option<String>,
    rate_limiter: Option<RateLimiter>,
}

impl HttpRequestProxyBuilder {
    /// Set the user agent string.
    pub fn user_agent(mut self, ua: &str) -> Self {
        self.user_agent = Some(ua.to_string());
        self
    }

    /// Set a shared rate limiter.
    /// Without this, creates a per-proxy limiter using the request delay.
    pub fn rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// Build the `HttpRequestProxy`.
    pub fn build(self) -> Result<HttpRequestProxy, ProxyError> {
        let user_agent = self.user_agent.as_deref().unwrap_or(USER_AGENT);

        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(self.timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| ProxyError::Config(e.to_string()))?;

        let rate_limiter = self.rate_limiter.unwrap_or_else(|| {
            RateLimiter::with_config(RateLimitConfig::with_base_delay(self.request_delay))
        });

        Ok(HttpRequestProxy {
            client,
            endpoint: self.endpoint,
            rate_limiter,
        })
    }
}

impl HttpRequestProxy {
    /// Create a builder for the given endpoint.
    pub fn builder(
        endpoint: ApiEndpoint,
        timeout: Duration,
        request_delay: Duration,
    ) -> HttpRequestProxyBuilder {
        HttpRequestProxyBuilder {
            endpoint,
            timeout,
            request_delay,
            user_agent: None,
            rate_limiter: None,
        }
    }

    pub fn endpoint(&self) -> &ApiEndpoint {
        &self.endpoint
    }
}

#[async_trait]
impl RequestProxy for HttpRequestProxy {
    fn name(&self) -> &str {
        &self.endpoint.name
    }

    async fn search(&self, params: &SearchParams) -> Result<RawSearchResult, ProxyError> {
        let url = self.endpoint.request_url(params)?;
        let host = self.rate_limiter.acquire(url.as_str()).await;

        debug!("[{}] GET {}", self.endpoint.name, url);

        let response = self
            .client
            .get(url.clone())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ProxyError::Http(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 || status.as_u16() == 503 {
            if let Some(ref host) = host {
                let retry_after = parse_retry_after(
                    response
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok()),
                );
                self.rate_limiter
                    .report_rate_limit(host, status.as_u16(), retry_after)
                    .await;
            }
        }

        if !status.is_success() {
            return Err(ProxyError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        if let Some(ref host) = host {
            self.rate_limiter.report_success(host).await;
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ProxyError::Decode(e.to_string()))?;

        Ok(self.endpoint.decode(&payload))
    }
}
