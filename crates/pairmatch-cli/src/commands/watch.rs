//! Print the leaderboard every time it changes.

use anyhow::{Context, Result};
use pairmatch_core::LeaderboardNotifier;
use pairmatch_core::leaderboard::format::format_leaderboard_console;

use crate::cli_utils;
use crate::settings::Settings;

pub fn run(settings: &Settings, limit: Option<usize>) -> Result<()> {
    let store = cli_utils::open_store(settings);
    let limit = limit.unwrap_or(store.default_limit());

    print!("{}", format_leaderboard_console(&store.query_top(limit)));

    let notifier = LeaderboardNotifier::new(store).with_limit(limit);
    let mut subscription = notifier
        .subscribe(|entries| {
            println!();
            print!("{}", format_leaderboard_console(entries));
        })
        .context("Failed to subscribe to leaderboard changes")?;

    cli_utils::prompt("Watching for changes. Press Enter to stop.\n")?;
    notifier.unsubscribe(&mut subscription);
    Ok(())
}
