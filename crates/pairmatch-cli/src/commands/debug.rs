//! Debug probe commands.

use anyhow::{Context, Result};
use pairmatch_core::debug::LeaderboardProbe;

use crate::cli_utils;
use crate::settings::Settings;

/// Print the current top list as JSON
pub fn get(settings: &Settings) -> Result<()> {
    let probe = LeaderboardProbe::new(cli_utils::open_store(settings));
    let report = probe.get();
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    println!("{}", json);
    Ok(())
}

/// Insert a test entry
pub fn add(settings: &Settings, name: &str, score: u32) -> Result<()> {
    let probe = LeaderboardProbe::new(cli_utils::open_store(settings));
    let row = probe
        .add(name, score)
        .with_context(|| format!("Failed to add entry for {}", name))?;
    println!("Added {} ({} pts) as {}", row.player_name, row.score, row.id);
    Ok(())
}
