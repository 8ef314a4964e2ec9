//! Description of a museum search endpoint.

use serde_json::Value;
use url::Url;

use super::ProxyError;
use crate::models::{RawSearchResult, SearchParams};
use crate::utils::extract_path;

/// Query parameter names a backend uses for each normalized parameter.
///
/// `None` means the backend has no such parameter and it is never sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamNames {
    pub search_term: String,
    pub strict_item: String,
    pub id_filter: String,
    pub page: String,
    pub page_size: String,
    pub random_order: Option<String>,
    pub image_only: Option<String>,
}

/// Everything a proxy needs to call one backend's search API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoint {
    /// Backend identifier, used as the proxy name.
    pub name: String,
    pub search_url: String,
    pub params: ParamNames,
    /// Dot-path to the total match count in the response.
    pub count_path: String,
    /// Dot-path to the records array in the response.
    pub records_path: String,
    /// Largest page number the backend accepts.
    pub max_page: u32,
    pub supports_random_order: bool,
}

impl ApiEndpoint {
    /// Clamp a page number into the range the backend accepts.
    pub fn clamp_page(&self, page: u32) -> u32 {
        page.clamp(1, self.max_page.max(1))
    }

    /// Query pairs for a request, with the page already clamped.
    pub fn encode(&self, params: &SearchParams) -> Vec<(String, String)> {
        let names = &self.params;
        let mut query = Vec::new();

        if let Some(ref term) = params.search_term {
            query.push((names.search_term.clone(), term.clone()));
        }
        if let Some(ref item) = params.strict_item {
            query.push((names.strict_item.clone(), item.clone()));
        }
        if let Some(ref id) = params.id_filter {
            query.push((names.id_filter.clone(), id.clone()));
        }
        query.push((names.page.clone(), self.clamp_page(params.page).to_string()));
        query.push((names.page_size.clone(), params.page_size.max(1).to_string()));

        if params.random_order {
            if let Some(ref name) = names.random_order {
                query.push((name.clone(), "1".to_string()));
            }
        }
        if params.image_only {
            if let Some(ref name) = names.image_only {
                query.push((name.clone(), "1".to_string()));
            }
        }

        query
    }

    /// Full request URL for a search.
    pub fn request_url(&self, params: &SearchParams) -> Result<Url, ProxyError> {
        Url::parse_with_params(&self.search_url, self.encode(params))
            .map_err(|e| ProxyError::Config(format!("invalid search URL '{}': {}", self.search_url, e)))
    }

    /// Pull the match count and records out of a decoded payload.
    pub fn decode(&self, payload: &Value) -> RawSearchResult {
        RawSearchResult {
            record_count: extract_path(payload, &self.count_path).as_u64(),
            records: extract_path(payload, &self.records_path)
                .as_array()
                .cloned(),
        }
    }
}
