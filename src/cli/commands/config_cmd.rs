//! Configuration commands.

use console::style;

use curio::config::{Config, Settings};

use crate::cli::icons::{dim_arrow, warn};

/// Print resolved settings.
pub fn cmd_config_show(settings: &Settings, config: &Config) -> anyhow::Result<()> {
    match config.source_path {
        Some(ref path) => println!("{} Config file: {}", dim_arrow(), path.display()),
        None => println!("{} No config file found, using defaults", warn()),
    }

    println!("\n{}", style("Settings").bold());
    println!("{}", "-".repeat(40));
    println!("{:<20} {}", "museum", settings.museum);
    println!("{:<20} {}", "data_dir", settings.data_dir.display());
    println!("{:<20} {}", "database", settings.database_path().display());
    println!("{:<20} {}", "user_agent", settings.user_agent);
    println!("{:<20} {}s", "request_timeout", settings.request_timeout);
    println!("{:<20} {}ms", "request_delay", settings.request_delay_ms);
    println!("{:<20} {}", "max_attempts", settings.max_attempts);
    println!("{:<20} {}", "history_max_items", settings.history_max_items);
    println!("{:<20} {}", "page_size", settings.page_size);
    println!("{:<20} {}", "strategy", settings.strategy.as_str());
    println!("{:<20} {}", "image_only", settings.image_only);
    println!("{:<20} {}", "ephemeral", settings.ephemeral);

    if settings.search.is_empty() {
        println!("{:<20} (built-in)", "search.terms");
    } else {
        println!("{:<20} {}", "search.terms", settings.search.terms.join(", "));
    }
    println!("{:<20} {}", "search.strict", settings.search.strict);

    Ok(())
}
