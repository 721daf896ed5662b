//! Print the ranked leaderboard.

use anyhow::Result;
use pairmatch_core::leaderboard::format::format_leaderboard_console;

use crate::cli_utils;
use crate::settings::Settings;

pub fn run(settings: &Settings, limit: Option<usize>) -> Result<()> {
    let store = cli_utils::open_store(settings);
    let entries = store.query_top(limit.unwrap_or(store.default_limit()));
    print!("{}", format_leaderboard_console(&entries));
    Ok(())
}
