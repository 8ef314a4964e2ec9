//! Museum API clients.
//!
//! A [`MuseumApiClient`] turns the acquisition protocol into requests
//! against one museum's search API. Backends supply the endpoint
//! description, record normalization and URL builders; request sequencing
//! is shared.

mod budget;
mod error;
mod protocol;
mod vam;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use budget::AttemptBudget;
pub use error::{AcquisitionError, ErrorKind};
pub use protocol::page_for_offset;
pub use vam::VamClient;

use crate::config::{ConfigError, SearchConfiguration, Settings};
use crate::models::{ObjectRecord, RawSearchResult};
use crate::proxy::{ApiEndpoint, RequestProxy};
use crate::terms::SearchTermProvider;

/// Backend used when none is configured.
pub const DEFAULT_MUSEUM: &str = "vam";

/// Known backend identifiers.
pub const MUSEUMS: &[&str] = &[vam::MUSEUM_ID];

/// How a random object is obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AcquisitionStrategy {
    /// Native randomization when the backend supports it, else count-then-offset.
    #[default]
    Auto,
    /// Single request with the backend's random-order flag.
    Native,
    /// Count probe followed by a fetch at a random offset.
    #[serde(rename = "count-offset", alias = "count-then-offset")]
    CountThenOffset,
}

impl AcquisitionStrategy {
    /// Resolve to a concrete strategy for `endpoint`.
    ///
    /// Never returns `Auto`. `Native` on a backend without random ordering
    /// falls back to count-then-offset.
    pub fn resolve(self, endpoint: &ApiEndpoint) -> Self {
        match self {
            Self::CountThenOffset => Self::CountThenOffset,
            Self::Auto | Self::Native if endpoint.supports_random_order => Self::Native,
            Self::Native => {
                tracing::warn!(
                    "{} has no random ordering, using count-then-offset",
                    endpoint.name
                );
                Self::CountThenOffset
            }
            Self::Auto => Self::CountThenOffset,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Native => "native",
            Self::CountThenOffset => "count-offset",
        }
    }
}

impl std::str::FromStr for AcquisitionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "native" => Ok(Self::Native),
            "count-offset" | "count-then-offset" => Ok(Self::CountThenOffset),
            other => Err(format!("unknown strategy '{}'", other)),
        }
    }
}

/// Tunables for the acquisition protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Page size for offset fetches.
    pub page_size: u32,
    pub strategy: AcquisitionStrategy,
    /// Restrict searches to objects with images.
    pub image_only: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            page_size: 2,
            strategy: AcquisitionStrategy::Auto,
            image_only: true,
        }
    }
}

impl From<&Settings> for ClientOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            page_size: settings.page_size.max(1),
            strategy: settings.strategy,
            image_only: settings.image_only,
        }
    }
}

/// Client for one museum's collection search API.
#[async_trait]
pub trait MuseumApiClient: Send + Sync {
    /// Backend identifier (e.g., "vam").
    fn id(&self) -> &str;

    /// Endpoint description used by the HTTP proxy.
    fn endpoint(&self) -> &ApiEndpoint;

    fn proxy(&self) -> &dyn RequestProxy;

    fn terms(&self) -> &SearchTermProvider;

    fn options(&self) -> &ClientOptions;

    /// Map one raw API record onto the canonical shape.
    ///
    /// Never fails: missing fields become empty strings or `None`.
    fn normalize(&self, raw: &Value) -> ObjectRecord;

    /// Display image URL for an image identifier.
    fn build_image_url(&self, image_id: &str) -> String;

    /// Public permalink for an object identifier.
    fn build_object_url(&self, id: &str) -> String;

    /// Install a search configuration; empty means the built-in terms.
    fn initialize(&self, config: SearchConfiguration) {
        self.terms().configure(config.terms, config.strict);
    }

    /// Plain search, outside any attempt budget.
    async fn search(
        &self,
        term: &str,
        page: u32,
        page_size: u32,
    ) -> Result<RawSearchResult, AcquisitionError> {
        protocol::search(self, term, page, page_size).await
    }

    /// Fetch the object at a zero-based offset in `term`'s result set.
    async fn fetch_by_offset(
        &self,
        term: &str,
        offset: u64,
        budget: &mut AttemptBudget,
    ) -> Result<ObjectRecord, AcquisitionError> {
        protocol::fetch_by_offset(self, term, offset, budget).await
    }

    /// Look up one object by identifier.
    async fn fetch_by_id(&self, id: &str) -> Result<ObjectRecord, AcquisitionError> {
        protocol::fetch_by_id(self, id).await
    }

    /// One pass of the acquisition protocol for `term`.
    async fn attempt_random(
        &self,
        term: &str,
        budget: &mut AttemptBudget,
    ) -> Result<ObjectRecord, AcquisitionError> {
        protocol::attempt_random(self, term, budget).await
    }

    /// Acquire a random object, rotating terms until `budget` runs out.
    async fn get_random_object(
        &self,
        budget: &mut AttemptBudget,
    ) -> Result<ObjectRecord, AcquisitionError> {
        crate::acquisition::acquire_with_rotation(self, budget).await
    }
}

/// Endpoint description for a backend.
pub fn endpoint_for(museum: &str) -> Result<ApiEndpoint, ConfigError> {
    match museum {
        vam::MUSEUM_ID => Ok(VamClient::api_endpoint()),
        other => Err(ConfigError::UnknownMuseum(other.to_string())),
    }
}

/// Create the client for a backend.
pub fn create_client(
    museum: &str,
    proxy: Arc<dyn RequestProxy>,
    options: ClientOptions,
) -> Result<Arc<dyn MuseumApiClient>, ConfigError> {
    match museum {
        vam::MUSEUM_ID => Ok(Arc::new(VamClient::new(proxy).with_options(options))),
        other => Err(ConfigError::UnknownMuseum(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::ScriptedProxy;

    #[test]
    fn test_factory() {
        let proxy = Arc::new(ScriptedProxy::new());
        let client = create_client("vam", proxy.clone(), ClientOptions::default()).unwrap();
        assert_eq!(client.id(), "vam");

        let err = create_client("louvre", proxy, ClientOptions::default()).err();
        assert!(matches!(err, Some(ConfigError::UnknownMuseum(ref m)) if m == "louvre"));
        assert!(endpoint_for("louvre").is_err());
    }

    #[test]
    fn test_strategy_resolution() {
        let mut endpoint = endpoint_for(DEFAULT_MUSEUM).unwrap();
        endpoint.supports_random_order = true;
        assert_eq!(
            AcquisitionStrategy::Auto.resolve(&endpoint),
            AcquisitionStrategy::Native
        );
        assert_eq!(
            AcquisitionStrategy::CountThenOffset.resolve(&endpoint),
            AcquisitionStrategy::CountThenOffset
        );

        endpoint.supports_random_order = false;
        assert_eq!(
            AcquisitionStrategy::Auto.resolve(&endpoint),
            AcquisitionStrategy::CountThenOffset
        );
        assert_eq!(
            AcquisitionStrategy::Native.resolve(&endpoint),
            AcquisitionStrategy::CountThenOffset
        );
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("native".parse::<AcquisitionStrategy>(), Ok(AcquisitionStrategy::Native));
        assert_eq!(
            "count-then-offset".parse::<AcquisitionStrategy>(),
            Ok(AcquisitionStrategy::CountThenOffset)
        );
        assert!("sometimes".parse::<AcquisitionStrategy>().is_err());
        assert_eq!(
            serde_json::to_string(&AcquisitionStrategy::CountThenOffset).unwrap(),
            "\"count-offset\""
        );
    }
}
