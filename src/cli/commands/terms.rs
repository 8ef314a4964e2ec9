//! Search term commands.

use console::style;

use curio::config::{SearchConfiguration, Settings};
use curio::terms::DEFAULT_SEARCH_TERMS;

use crate::cli::helpers::{effective_search, open_store};
use crate::cli::icons::{dim_arrow, success, warn};

/// Show the active search terms and where they came from.
pub async fn cmd_terms_show(settings: &Settings) -> anyhow::Result<()> {
    let store = open_store(settings)?;
    let (search, source) = effective_search(settings, &store).await;
    let strict = search.strict_value();

    let terms: Vec<String> = if search.is_empty() {
        DEFAULT_SEARCH_TERMS.iter().map(|t| t.to_string()).collect()
    } else {
        search.terms
    };

    println!(
        "\n{} ({}, {})",
        style("Search Terms").bold(),
        source.as_str(),
        strict
    );
    println!("{}", "-".repeat(40));
    for term in terms {
        println!("  {}", term);
    }

    Ok(())
}

/// Save search terms to the synced settings.
pub async fn cmd_terms_set(settings: &Settings, terms: &str, strict: bool) -> anyhow::Result<()> {
    let config = SearchConfiguration::new(terms.split(',').map(String::from).collect(), strict);
    if config.is_empty() {
        println!("{} No terms given; use 'curio terms reset' to restore defaults", warn());
        return Ok(());
    }

    let store = open_store(settings)?;
    config.save_synced(store.as_ref()).await?;

    println!(
        "{} Saved {} search term(s) ({})",
        success(),
        config.terms.len(),
        config.strict_value()
    );
    println!(
        "  {} {}",
        dim_arrow(),
        SearchConfiguration::encode_terms(&config.terms)
    );
    Ok(())
}

/// Remove synced search terms.
pub async fn cmd_terms_reset(settings: &Settings) -> anyhow::Result<()> {
    let store = open_store(settings)?;
    SearchConfiguration::clear_synced(store.as_ref()).await?;
    println!("{} Search terms reset", success());
    Ok(())
}
