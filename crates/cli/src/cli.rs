//! Command-line definition.

use clap::{Parser, Subcommand};

use gamedex_core::SortOption;

/// Browse the RAWG game catalog and manage a local collection.
#[derive(Parser)]
#[command(name = "gamedex")]
#[command(about = "Browse the game catalog and keep a collection of favourites")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file (overrides GAMEDEX_CONFIG)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List catalog games page by page
    Browse {
        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,
        /// Genre slug to filter by (repeatable)
        #[arg(short, long = "genre")]
        genres: Vec<String>,
        /// Ordering: default, name-asc, name-desc, rating-asc, rating-desc, newest
        #[arg(long, default_value = "default")]
        sort: SortOption,
        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
    },

    /// Run a debounced search as a search box would
    Search {
        /// Text to search for
        text: String,
    },

    /// Show details for a game
    Show {
        /// Game id
        id: u64,
    },

    /// Add a game to the collection
    Save {
        /// Game id
        id: u64,
    },

    /// Remove a game from the collection
    Remove {
        /// Game id
        id: u64,
    },

    /// List saved games
    Collection,

    /// Print the effective configuration with secrets redacted
    Config,
}
