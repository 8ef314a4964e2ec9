//! Request proxies: the only components that talk to a museum API.
//!
//! A proxy takes a backend-neutral [`SearchParams`] and returns the parsed
//! search response or a typed failure. The HTTP proxy is driven by the
//! [`ApiEndpoint`] description each backend publishes.

mod endpoint;
mod http;
mod scripted;

pub use endpoint::{ApiEndpoint, ParamNames};
pub use http::{HttpRequestProxy, HttpRequestProxyBuilder, USER_AGENT};
pub use scripted::ScriptedProxy;

use async_trait::async_trait;

use crate::models::{RawSearchResult, SearchParams};

/// Errors returned by a request proxy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProxyError {
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
    #[error("Failed to decode response: {0}")]
    Decode(String),
    #[error("Proxy configuration error: {0}")]
    Config(String),
}

impl ProxyError {
    /// Whether the server asked us to slow down.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Status { status: 429 | 503, .. })
    }
}

/// Performs search requests against a museum API on behalf of the core.
#[async_trait]
pub trait RequestProxy: Send + Sync {
    /// Identifier for logging.
    fn name(&self) -> &str;

    /// Run one search request.
    async fn search(&self, params: &SearchParams) -> Result<RawSearchResult, ProxyError>;
}
