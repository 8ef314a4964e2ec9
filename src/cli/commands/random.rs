//! Random object command.

use curio::acquisition::{AcquireOutcome, AcquisitionController, AcquisitionEvent};
use curio::config::Settings;

use crate::cli::helpers::{build_client, open_history, open_store, print_record};
use crate::cli::icons::{dim_arrow, error, info};

/// Fetch one random object through the acquisition controller.
pub async fn cmd_random(settings: &Settings, json: bool) -> anyhow::Result<()> {
    let store = open_store(settings)?;
    let history = open_history(settings, &store).await;
    let client = build_client(settings, &store).await?;

    let controller = AcquisitionController::new(client, history)
        .with_max_attempts(settings.max_attempts);

    let mut events = controller.subscribe();
    let progress = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                AcquisitionEvent::Searching if !json => {
                    eprintln!("{} Searching...", info());
                }
                AcquisitionEvent::Retrying { term, error: e } if !json => {
                    eprintln!("  {} '{}': {}", dim_arrow(), term, e);
                }
                _ => {}
            }
        }
    });

    let result = controller.acquire().await;
    drop(controller);
    // Channel closes once the controller is gone
    let _ = progress.await;

    match result {
        Ok(AcquireOutcome::Acquired(record)) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print_record(&record);
            }
            Ok(())
        }
        Ok(outcome) => anyhow::bail!("Acquisition did not complete: {:?}", outcome),
        Err(e) => {
            eprintln!("{} {}", error(), e);
            Err(e.into())
        }
    }
}
