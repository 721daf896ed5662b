//! CLI argument definitions for pairmatch.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pairmatch")]
#[command(about = "Tile-matching memory game with a shared leaderboard", version)]
pub struct Args {
    /// Settings file (default: <config dir>/pairmatch/config.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<String>,

    /// Leaderboard store endpoint URL
    #[arg(long, env = "PAIRMATCH_STORE_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Leaderboard store API key
    #[arg(long, env = "PAIRMATCH_STORE_KEY")]
    pub api_key: Option<String>,

    /// Log at info level unless RUST_LOG is set
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Play rounds interactively (default)
    Play {
        /// Player name (defaults to the last name used)
        #[arg(long)]
        name: Option<String>,
    },
    /// Print the ranked leaderboard
    Leaderboard {
        /// Number of entries to show
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the leaderboard every time it changes
    Watch {
        /// Number of entries to show
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Move locally cached results into the shared leaderboard
    Migrate,
    /// Inspect or seed the leaderboard
    Debug {
        #[command(subcommand)]
        action: DebugAction,
    },
}

#[derive(Subcommand)]
pub enum DebugAction {
    /// Print the current top list as JSON
    Get,
    /// Insert a test entry (60 s, 10 moves)
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        score: u32,
    },
}
