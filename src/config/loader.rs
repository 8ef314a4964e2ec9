//! Configuration loading logic.

use std::path::PathBuf;

use super::{Config, Settings};

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Data directory (--data flag).
    pub data: Option<PathBuf>,
    /// Keep all state in memory.
    pub ephemeral: bool,
}

/// Load config from file sources.
async fn load_file_config(options: &LoadOptions) -> Config {
    // Priority 1: Explicit --config flag
    if let Some(ref config_path) = options.config_path {
        return match Config::load_from_path(config_path).await {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}: {}", config_path.display(), e);
                Config::default()
            }
        };
    }

    // Priority 2: Auto-discover via prefer
    Config::load().await
}

/// Load settings with explicit options.
///
/// Relative paths in the config file resolve against the file's directory,
/// or the current directory when no file was found.
pub async fn load_settings_with_options(options: LoadOptions) -> (Settings, Config) {
    let config = load_file_config(&options).await;

    let base_dir = config
        .base_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);

    if let Some(ref data) = options.data {
        let expanded = shellexpand::tilde(&data.to_string_lossy()).into_owned();
        settings.data_dir = PathBuf::from(expanded);
    }
    settings.ephemeral = options.ephemeral;

    if let Some(ref path) = config.source_path {
        tracing::debug!("Loaded config from {}", path.display());
    }

    (settings, config)
}
