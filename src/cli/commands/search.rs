//! Single search command.

use console::style;

use curio::config::Settings;

use crate::cli::helpers::{build_client, open_store, truncate};
use crate::cli::icons::warn;

/// Run one search and print the page summary.
pub async fn cmd_search(
    settings: &Settings,
    term: &str,
    page: u32,
    page_size: u32,
    strict: bool,
) -> anyhow::Result<()> {
    let store = open_store(settings)?;
    let client = build_client(settings, &store).await?;
    if strict != client.terms().is_strict() {
        client.terms().configure(client.terms().terms(), strict);
    }

    let result = client.search(term, page, page_size).await?;
    let records = result.page_records();

    if records.is_empty() {
        println!("{} No results for '{}'", warn(), term);
        return Ok(());
    }

    let total = result
        .record_count
        .map(|n| n.to_string())
        .unwrap_or_else(|| "?".to_string());
    println!(
        "\n{} ({} matches, page {})",
        style(format!("Results for '{}'", term)).bold(),
        total,
        page
    );
    println!("{}", "-".repeat(70));
    println!("{:<12} {:<45} Image", "ID", "Title");
    println!("{}", "-".repeat(70));

    for raw in records {
        let record = client.normalize(raw);
        println!(
            "{:<12} {:<45} {}",
            record.id,
            truncate(&record.title, 44),
            if record.has_image() { "yes" } else { "no" }
        );
    }

    Ok(())
}
