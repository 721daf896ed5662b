//! Move locally cached results into the shared leaderboard.

use std::sync::Arc;

use anyhow::{Context, Result};
use pairmatch_core::{LeaderboardStore, LegacyMigration, LocalCache, MigrationOutcome};
use tracing::warn;

use crate::cli_utils;
use crate::settings::Settings;

pub fn run(settings: &Settings) -> Result<()> {
    let store = cli_utils::open_store(settings);
    let cache = cli_utils::open_cache(settings);

    let outcome = LegacyMigration::new(cache, store)
        .migrate()
        .context("Migration failed; local results were kept")?;
    println!("{}", describe(outcome));
    Ok(())
}

/// Migrate before playing; failures only warn.
pub fn run_quietly(cache: Arc<dyn LocalCache>, store: Arc<LeaderboardStore>) {
    match LegacyMigration::new(cache, store).migrate() {
        Ok(MigrationOutcome::NothingToMigrate) => {}
        Ok(outcome) => println!("{}", describe(outcome)),
        Err(e) => warn!("Local results not migrated: {}", e),
    }
}

fn describe(outcome: MigrationOutcome) -> String {
    match outcome {
        MigrationOutcome::NothingToMigrate => "No local results to migrate.".to_string(),
        MigrationOutcome::Migrated { migrated, skipped: 0 } => {
            format!("Migrated {} local results.", migrated)
        }
        MigrationOutcome::Migrated { migrated, skipped } => format!(
            "Migrated {} local results ({} unreadable entries skipped).",
            migrated, skipped
        ),
    }
}
