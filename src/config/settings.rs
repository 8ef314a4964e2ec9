//! Application settings.

use std::fs;
use std::path::PathBuf;

use crate::museum::AcquisitionStrategy;

use super::{SearchConfiguration, DEFAULT_DATABASE_FILENAME};

/// Resolved application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Museum backend identifier.
    pub museum: String,
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Key-value database filename.
    pub database_filename: String,
    /// User agent for HTTP requests.
    pub user_agent: String,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// Delay between requests in milliseconds.
    pub request_delay_ms: u64,
    /// Request attempts allowed per acquisition.
    pub max_attempts: u32,
    /// Number of history entries kept.
    pub history_max_items: usize,
    /// Page size for offset fetches.
    pub page_size: u32,
    pub strategy: AcquisitionStrategy,
    pub image_only: bool,
    /// Search terms from the config file; synced settings may override.
    pub search: SearchConfiguration,
    /// Keep all state in memory.
    pub ephemeral: bool,
}

impl Default for Settings {
    fn default() -> Self {
        // Falls back gracefully: data dir -> home dir -> current dir
        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("curio");

        Self {
            museum: crate::museum::DEFAULT_MUSEUM.to_string(),
            data_dir,
            database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            user_agent: crate::proxy::USER_AGENT.to_string(),
            request_timeout: 30,
            request_delay_ms: 500,
            max_attempts: 5,
            history_max_items: 10,
            page_size: 2,
            strategy: AcquisitionStrategy::default(),
            image_only: true,
            search: SearchConfiguration::default(),
            ephemeral: false,
        }
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    /// Get the full path to the key-value database.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    /// Ensure the data directory exists.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create data directory '{}': {}",
                    self.data_dir.display(),
                    e
                ),
            )
        })
    }
}
