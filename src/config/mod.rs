//! Configuration management for curio using the prefer crate.

mod loader;
pub mod search;
mod settings;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::museum::AcquisitionStrategy;

pub use loader::{load_settings_with_options, LoadOptions};
pub use search::SearchConfiguration;
pub use settings::Settings;

/// Default key-value database filename.
pub const DEFAULT_DATABASE_FILENAME: &str = "curio.db";

/// Errors from loading configuration or selecting a backend.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(String),
    #[error("Failed to parse config file: {0}")]
    Parse(String),
    #[error("Unknown museum '{0}'")]
    UnknownMuseum(String),
}

/// Search section of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSection {
    /// Search terms; empty means the built-in list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub terms: Vec<String>,
    /// Match terms against the object-name field instead of free text.
    #[serde(default)]
    pub strict: bool,
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Museum backend identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub museum: Option<String>,
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// User agent string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    /// Delay between requests in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_delay_ms: Option<u64>,
    /// Request attempts allowed per acquisition.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "max_search_counts")]
    pub max_attempts: Option<u32>,
    /// Number of history entries kept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_max_items: Option<usize>,
    /// Page size for offset fetches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    /// Acquisition strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<AcquisitionStrategy>,
    /// Only consider objects with images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_only: Option<bool>,
    #[serde(default)]
    pub search: SearchSection,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers curio config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("curio").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("Ignoring config file: {}", e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            // No config file found
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML, and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::Read(e.to_string()))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| ConfigError::Parse(format!("TOML: {}", e)))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::Parse(format!("YAML: {}", e)))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| ConfigError::Parse(format!("JSON: {}", e)))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Get the base directory for resolving relative paths.
    /// Returns the config file's parent directory if available, otherwise None.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref museum) = self.museum {
            settings.museum = museum.clone();
        }
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = user_agent.clone();
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(delay) = self.request_delay_ms {
            settings.request_delay_ms = delay;
        }
        if let Some(max_attempts) = self.max_attempts {
            settings.max_attempts = max_attempts.max(1);
        }
        if let Some(max_items) = self.history_max_items {
            settings.history_max_items = max_items;
        }
        if let Some(page_size) = self.page_size {
            settings.page_size = page_size.max(1);
        }
        if let Some(strategy) = self.strategy {
            settings.strategy = strategy;
        }
        if let Some(image_only) = self.image_only {
            settings.image_only = image_only;
        }
        settings.search = SearchConfiguration::new(self.search.terms.clone(), self.search.strict);
    }
}
