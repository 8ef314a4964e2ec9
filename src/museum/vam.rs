//! Victoria and Albert Museum collections API (v2).

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;

use super::{ClientOptions, MuseumApiClient};
use crate::models::ObjectRecord;
use crate::proxy::{ApiEndpoint, ParamNames, RequestProxy};
use crate::terms::SearchTermProvider;
use crate::utils::{extract_path, strip_light_markup};

pub(super) const MUSEUM_ID: &str = "vam";

const SEARCH_URL: &str = "https://api.vam.ac.uk/v2/objects/search";
const IMAGE_BASE_URL: &str = "https://framemark.vam.ac.uk/collections";
const COLLECTIONS_URL: &str = "https://collections.vam.ac.uk/item";

/// The API rejects page numbers above this.
const MAX_PAGE: u32 = 1000;

/// Trailing life-span on a maker name, e.g. `Morris, William (1834-1896)`.
static MAKER_DATES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)\s*(\([^()]*\d[^()]*\))\s*$").unwrap());

/// V&A backend.
pub struct VamClient {
    proxy: Arc<dyn RequestProxy>,
    endpoint: ApiEndpoint,
    terms: SearchTermProvider,
    options: ClientOptions,
}

impl VamClient {
    pub fn new(proxy: Arc<dyn RequestProxy>) -> Self {
        Self {
            proxy,
            endpoint: Self::api_endpoint(),
            terms: SearchTermProvider::new(),
            options: ClientOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Search endpoint description for the V&A API.
    pub fn api_endpoint() -> ApiEndpoint {
        ApiEndpoint {
            name: MUSEUM_ID.to_string(),
            search_url: SEARCH_URL.to_string(),
            params: ParamNames {
                search_term: "q".to_string(),
                strict_item: "q_object_name".to_string(),
                id_filter: "kw_system_number".to_string(),
                page: "page".to_string(),
                page_size: "page_size".to_string(),
                random_order: Some("random".to_string()),
                image_only: Some("images_exist".to_string()),
            },
            count_path: "info.record_count".to_string(),
            records_path: "records".to_string(),
            max_page: MAX_PAGE,
            supports_random_order: true,
        }
    }
}

/// String at `path`, with numbers rendered and everything else empty.
fn text(raw: &Value, path: &str) -> String {
    match extract_path(raw, path) {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Split a maker name into `(name, life_span)`.
fn split_maker(raw: &str) -> (String, String) {
    let name = raw.trim();
    let (name, dates) = match MAKER_DATES.captures(name) {
        Some(caps) => (
            caps.get(1).map_or("", |m| m.as_str()),
            caps.get(2).map_or("", |m| m.as_str()),
        ),
        None => (name, ""),
    };

    let lower = name.to_lowercase();
    if lower == "unknown" || lower == "unknown maker" {
        return (String::new(), String::new());
    }
    (name.to_string(), dates.to_string())
}

#[async_trait]
impl MuseumApiClient for VamClient {
    fn id(&self) -> &str {
        MUSEUM_ID
    }

    fn endpoint(&self) -> &ApiEndpoint {
        &self.endpoint
    }

    fn proxy(&self) -> &dyn RequestProxy {
        self.proxy.as_ref()
    }

    fn terms(&self) -> &SearchTermProvider {
        &self.terms
    }

    fn options(&self) -> &ClientOptions {
        &self.options
    }

    fn normalize(&self, raw: &Value) -> ObjectRecord {
        let id = text(raw, "systemNumber");
        let object_type = text(raw, "objectType");

        let mut title = strip_light_markup(&text(raw, "_primaryTitle"));
        if title.is_empty() {
            title = object_type.clone();
        }

        let (maker, maker_dates) = split_maker(&text(raw, "_primaryMaker.name"));

        let image_id = Some(text(raw, "_primaryImageId")).filter(|s| !s.is_empty());
        let image_url = image_id
            .as_deref()
            .map(|image_id| self.build_image_url(image_id))
            .unwrap_or_default();

        let mut description = text(raw, "summaryDescription");
        if description.is_empty() {
            description = text(raw, "briefDescription");
        }

        let mut record = ObjectRecord {
            collection_url: if id.is_empty() {
                String::new()
            } else {
                self.build_object_url(&id)
            },
            id,
            title,
            date: text(raw, "_primaryDate"),
            maker,
            maker_dates,
            place: text(raw, "_primaryPlace"),
            object_type,
            accession_number: text(raw, "accessionNumber"),
            museum_location: text(raw, "_currentLocation.displayName"),
            image_id,
            image_url,
            description: strip_light_markup(&description),
        };
        record.ensure_description();
        record
    }

    fn build_image_url(&self, image_id: &str) -> String {
        format!("{}/{}/full/!800,800/0/default.jpg", IMAGE_BASE_URL, image_id)
    }

    fn build_object_url(&self, id: &str) -> String {
        format!("{}/{}", COLLECTIONS_URL, id)
    }
}
