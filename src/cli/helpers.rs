//! Shared helpers for CLI commands.

use std::sync::Arc;
use std::time::Duration;

use console::style;
use tracing::warn;

use curio::config::{SearchConfiguration, Settings};
use curio::history::HistoryStore;
use curio::museum::{self, ClientOptions, MuseumApiClient};
use curio::proxy::HttpRequestProxy;
use curio::storage::{MemoryKeyValueStore, SharedStore, SqliteKeyValueStore};
use curio::ObjectRecord;

/// Where the active search terms came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermSource {
    Synced,
    ConfigFile,
    BuiltIn,
}

impl TermSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Synced => "synced settings",
            Self::ConfigFile => "config file",
            Self::BuiltIn => "built-in list",
        }
    }
}

/// Open the key-value store for these settings.
pub fn open_store(settings: &Settings) -> anyhow::Result<SharedStore> {
    if settings.ephemeral {
        return Ok(Arc::new(MemoryKeyValueStore::new()));
    }
    settings.ensure_directories()?;
    Ok(Arc::new(SqliteKeyValueStore::open(&settings.database_path())?))
}

/// Open the history, hydrated from the store.
pub async fn open_history(settings: &Settings, store: &SharedStore) -> Arc<HistoryStore> {
    let history = Arc::new(HistoryStore::new(
        settings.history_max_items,
        Some(store.clone()),
    ));
    history.load().await;
    history
}

/// Search configuration in effect: synced settings, then config file.
///
/// An empty result means the built-in list applies.
pub async fn effective_search(
    settings: &Settings,
    store: &SharedStore,
) -> (SearchConfiguration, TermSource) {
    match SearchConfiguration::load_synced(store.as_ref()).await {
        Ok(Some(config)) => return (config, TermSource::Synced),
        Ok(None) => {}
        Err(e) => warn!("Could not read synced search settings: {}", e),
    }

    if settings.search.is_empty() {
        (SearchConfiguration::default(), TermSource::BuiltIn)
    } else {
        (settings.search.clone(), TermSource::ConfigFile)
    }
}

/// Build the museum client for these settings over HTTP.
pub async fn build_client(
    settings: &Settings,
    store: &SharedStore,
) -> anyhow::Result<Arc<dyn MuseumApiClient>> {
    let endpoint = museum::endpoint_for(&settings.museum)?;
    let proxy = HttpRequestProxy::builder(
        endpoint,
        Duration::from_secs(settings.request_timeout),
        Duration::from_millis(settings.request_delay_ms),
    )
    .user_agent(&settings.user_agent)
    .build()?;

    let client = museum::create_client(
        &settings.museum,
        Arc::new(proxy),
        ClientOptions::from(settings),
    )?;

    let (search, _) = effective_search(settings, store).await;
    client.initialize(search);
    Ok(client)
}

/// Truncate a string to `max` characters, adding an ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a record in human-readable form.
pub fn print_record(record: &ObjectRecord) {
    println!("\n{}", style(&record.title).bold());
    println!("{}", "-".repeat(60));

    let maker = if record.maker_dates.is_empty() {
        record.maker.clone()
    } else {
        format!("{} {}", record.maker, record.maker_dates)
    };

    let fields = [
        ("ID", record.id.as_str()),
        ("Type", record.object_type.as_str()),
        ("Maker", maker.as_str()),
        ("Date", record.date.as_str()),
        ("Place", record.place.as_str()),
        ("Accession", record.accession_number.as_str()),
        ("Location", record.museum_location.as_str()),
    ];
    for (label, value) in fields {
        if !value.is_empty() {
            println!("{:<11} {}", format!("{}:", label), value);
        }
    }

    if record.image_url.is_empty() {
        println!("{:<11} {}", "Image:", style("(none)").dim());
    } else {
        println!("{:<11} {}", "Image:", record.image_url);
    }
    println!("{:<11} {}", "Link:", record.collection_url);
    println!("\n{}", record.description);
}
