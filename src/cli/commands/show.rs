//! Show a single object.

use curio::config::Settings;

use crate::cli::helpers::{build_client, open_store, print_record};

/// Look up an object by identifier.
pub async fn cmd_show(settings: &Settings, id: &str, json: bool) -> anyhow::Result<()> {
    let store = open_store(settings)?;
    let client = build_client(settings, &store).await?;
    let record = client.fetch_by_id(id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_record(&record);
    }
    Ok(())
}
