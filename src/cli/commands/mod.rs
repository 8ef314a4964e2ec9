//! CLI parser and command dispatch.

mod config_cmd;
mod history;
mod random;
mod search;
mod show;
mod terms;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use curio::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "curio")]
#[command(about = "Fetch a random object from a museum collection")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (overrides config file)
    #[arg(long, global = true, env = "CURIO_DATA")]
    data: Option<PathBuf>,

    /// Keep history and settings in memory for this run only
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a random object and add it to the history
    Random {
        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Look up an object by identifier
    Show {
        /// Object identifier (e.g., O1138364)
        id: String,
        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a single search and summarize the page
    Search {
        term: String,
        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: u32,
        /// Results per page
        #[arg(long, default_value = "10")]
        page_size: u32,
        /// Match the term against the object name only
        #[arg(long)]
        strict: bool,
    },

    /// Viewing history
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },

    /// Search term settings
    Terms {
        #[command(subcommand)]
        command: TermsCommands,
    },

    /// Configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// List recently viewed objects
    List {
        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove all history entries
    Clear,
}

#[derive(Subcommand)]
enum TermsCommands {
    /// Show the active search terms
    Show,
    /// Replace the search terms (comma-separated)
    Set {
        terms: String,
        /// Match terms against the object name only
        #[arg(long)]
        strict: bool,
    },
    /// Drop saved terms and use the config file or built-in list
    Reset,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show resolved settings
    Show,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        data: cli.data,
        ephemeral: cli.ephemeral,
    };
    let (settings, config) = load_settings_with_options(options).await;

    match cli.command {
        Commands::Random { json } => random::cmd_random(&settings, json).await,
        Commands::Show { id, json } => show::cmd_show(&settings, &id, json).await,
        Commands::Search {
            term,
            page,
            page_size,
            strict,
        } => search::cmd_search(&settings, &term, page, page_size, strict).await,
        Commands::History { command } => match command {
            HistoryCommands::List { json } => history::cmd_history_list(&settings, json).await,
            HistoryCommands::Clear => history::cmd_history_clear(&settings).await,
        },
        Commands::Terms { command } => match command {
            TermsCommands::Show => terms::cmd_terms_show(&settings).await,
            TermsCommands::Set { terms, strict } => {
                terms::cmd_terms_set(&settings, &terms, strict).await
            }
            TermsCommands::Reset => terms::cmd_terms_reset(&settings).await,
        },
        Commands::Config { command } => match command {
            ConfigCommands::Show => config_cmd::cmd_config_show(&settings, &config),
        },
    }
}
