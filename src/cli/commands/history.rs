//! History commands.

use console::style;

use curio::config::Settings;

use crate::cli::helpers::{open_history, open_store, truncate};
use crate::cli::icons::{success, warn};

/// List recently viewed objects.
pub async fn cmd_history_list(settings: &Settings, json: bool) -> anyhow::Result<()> {
    let store = open_store(settings)?;
    let history = open_history(settings, &store).await;
    let entries = history.list().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!(
            "{} No history yet. Run 'curio random' to fetch an object.",
            warn()
        );
        return Ok(());
    }

    println!("\n{}", style("Recently Viewed").bold());
    println!("{}", "-".repeat(78));
    println!("{:<12} {:<36} {:<12} Viewed", "ID", "Title", "Date");
    println!("{}", "-".repeat(78));

    for entry in entries {
        println!(
            "{:<12} {:<36} {:<12} {}",
            entry.id,
            truncate(&entry.title, 35),
            truncate(&entry.date, 11),
            entry.viewed_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

/// Remove all history entries.
pub async fn cmd_history_clear(settings: &Settings) -> anyhow::Result<()> {
    let store = open_store(settings)?;
    let history = open_history(settings, &store).await;
    let count = history.len().await;
    history.clear().await;

    println!("{} Cleared {} history entr(ies)", success(), count);
    Ok(())
}
