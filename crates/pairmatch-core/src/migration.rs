//! One-shot transfer of locally cached results into the shared leaderboard.
//!
//! The local copy is removed only after the store confirms the batch write,
//! so a failed run can simply be repeated later.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{error, info, warn};

use crate::cache::{LEGACY_LEADERBOARD_KEY, LocalCache};
use crate::error::{Error, Result};
use crate::leaderboard::{LeaderboardStore, NewEntry, PlayerName};

/// Result as it was cached before the shared leaderboard existed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyEntry {
    pub player_name: String,
    pub score: u32,
    /// Completion time in seconds
    pub time: u32,
    pub moves: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl LegacyEntry {
    /// Translate to the store's insert shape, keeping the original timestamp
    pub fn to_new_entry(&self) -> Option<NewEntry> {
        let player_name = PlayerName::truncated(&self.player_name)?;
        Some(NewEntry {
            player_name,
            score: self.score,
            time_seconds: self.time,
            moves: self.moves,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// No legacy data was cached
    NothingToMigrate,
    /// `migrated` rows were written; `skipped` cached rows were unusable
    Migrated { migrated: usize, skipped: usize },
}

pub struct LegacyMigration {
    cache: Arc<dyn LocalCache>,
    store: Arc<LeaderboardStore>,
}

impl LegacyMigration {
    pub fn new(cache: Arc<dyn LocalCache>, store: Arc<LeaderboardStore>) -> Self {
        Self { cache, store }
    }

    /// Move cached results into the store and clear the cache
    ///
    /// Returns `MigrationFailed` when the cache cannot be read or the store
    /// rejects the batch; the cache is left untouched in both cases.
    pub fn migrate(&self) -> Result<MigrationOutcome> {
        let raw = match self.cache.get(LEGACY_LEADERBOARD_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(MigrationOutcome::NothingToMigrate),
            Err(e) => return Err(self.fail(format!("cannot read local cache: {}", e))),
        };

        let items = match serde_json::from_str::<JsonValue>(&raw) {
            Ok(JsonValue::Array(items)) if !items.is_empty() => items,
            Ok(_) => return Ok(MigrationOutcome::NothingToMigrate),
            Err(e) => return Err(self.fail(format!("cached results are not valid JSON: {}", e))),
        };

        info!("Migrating {} cached leaderboard results...", items.len());

        let mut entries = Vec::with_capacity(items.len());
        let mut skipped = 0usize;
        for (index, item) in items.into_iter().enumerate() {
            let entry = serde_json::from_value::<LegacyEntry>(item)
                .ok()
                .and_then(|legacy| legacy.to_new_entry());
            match entry {
                Some(entry) => entries.push(entry),
                None => {
                    if skipped == 0 {
                        warn!(
                            "Skipping unusable cached result at index {} (further skips counted)",
                            index
                        );
                    }
                    skipped += 1;
                }
            }
        }

        if entries.is_empty() {
            return Err(self.fail(format!("none of the {} cached results are usable", skipped)));
        }

        let migrated = self
            .store
            .insert_many(&entries)
            .map_err(|e| self.fail(format!("store rejected batch: {}", e)))?;

        info!("Migration complete, clearing local cache");
        if let Err(e) = self.cache.remove(LEGACY_LEADERBOARD_KEY) {
            // Rows are already stored; a later run would insert them again
            error!("Migrated results but could not clear local cache: {}", e);
        }

        if skipped > 0 {
            warn!("{} cached results could not be migrated", skipped);
        }

        Ok(MigrationOutcome::Migrated { migrated, skipped })
    }

    fn fail(&self, message: String) -> Error {
        error!("Leaderboard migration failed: {}", message);
        Error::MigrationFailed(message)
    }
}
