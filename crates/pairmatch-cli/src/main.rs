mod cli;
mod cli_utils;
mod commands;
mod rest_backend;
mod settings;

use anyhow::Result;
use clap::Parser;
use cli::{Args, Command, DebugAction};
use tracing_subscriber::EnvFilter;

use settings::Settings;

fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins; otherwise warn, or info with --verbose
    let default_filter = if args.verbose {
        "pairmatch_cli=info,pairmatch_core=info"
    } else {
        "pairmatch_cli=warn,pairmatch_core=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let settings = Settings::resolve(args.config.as_deref())?
        .with_overrides(args.endpoint.as_deref(), args.api_key.as_deref());

    match args.command {
        Some(Command::Play { name }) => commands::play::run(&settings, name.as_deref()),
        Some(Command::Leaderboard { limit }) => commands::leaderboard::run(&settings, limit),
        Some(Command::Watch { limit }) => commands::watch::run(&settings, limit),
        Some(Command::Migrate) => commands::migrate::run(&settings),
        Some(Command::Debug { action }) => match action {
            DebugAction::Get => commands::debug::get(&settings),
            DebugAction::Add { name, score } => commands::debug::add(&settings, &name, score),
        },
        None => commands::play::run(&settings, None),
    }
}
