use std::sync::{Arc, Mutex};

use tracing::{debug, error, info, warn};

use crate::config::leaderboard::DEFAULT_LIMIT;
use crate::error::{Error, Result};

use super::backend::{ChangeFeed, LeaderboardBackend, WatchId};
use super::diagnostics::{LeaderboardDiagnostics, StoreOperation};
use super::{LeaderboardEntry, NewEntry, sort_ranked};

/// Ranked leaderboard on top of a remote table
///
/// Writes log and return failures without retrying; reads fail open to the
/// last list that was fetched successfully.
pub struct LeaderboardStore {
    backend: Arc<dyn LeaderboardBackend>,
    default_limit: usize,
    last_known: Mutex<Vec<LeaderboardEntry>>,
    diagnostics: Option<Arc<dyn LeaderboardDiagnostics>>,
}

impl LeaderboardStore {
    pub fn new(backend: Arc<dyn LeaderboardBackend>) -> Self {
        Self {
            backend,
            default_limit: DEFAULT_LIMIT,
            last_known: Mutex::new(Vec::new()),
            diagnostics: None,
        }
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit.max(1);
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn LeaderboardDiagnostics>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// Persist one result
    pub fn insert(&self, entry: &NewEntry) -> Result<LeaderboardEntry> {
        match self.backend.insert_one(entry) {
            Ok(row) => {
                info!(
                    "Saved leaderboard entry {} for {} ({} pts)",
                    row.id, row.player_name, row.score
                );
                if let Some(d) = &self.diagnostics {
                    d.inserted(&row);
                }
                Ok(row)
            }
            Err(e) => {
                let err = unavailable(e);
                error!("Failed to save leaderboard entry for {}: {}", entry.player_name, err);
                self.report_failure(StoreOperation::Insert, &err);
                Err(err)
            }
        }
    }

    /// Persist several results in one request
    pub fn insert_many(&self, entries: &[NewEntry]) -> Result<usize> {
        if entries.is_empty() {
            return Ok(0);
        }
        match self.backend.insert_many(entries) {
            Ok(count) => {
                info!("Saved {} leaderboard entries", count);
                if let Some(d) = &self.diagnostics {
                    d.batch_inserted(count);
                }
                Ok(count)
            }
            Err(e) => {
                let err = unavailable(e);
                error!("Failed to save {} leaderboard entries: {}", entries.len(), err);
                self.report_failure(StoreOperation::InsertMany, &err);
                Err(err)
            }
        }
    }

    /// Highest ranked entries, at least one
    ///
    /// Never fails: on transport errors the last successful result (cut to
    /// `limit`) is returned, or an empty list.
    pub fn query_top(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let limit = limit.max(1);
        match self.backend.query_ordered(limit) {
            Ok(mut entries) => {
                sort_ranked(&mut entries);
                entries.truncate(limit);
                debug!("Loaded {} leaderboard entries", entries.len());
                *self.last_known.lock().unwrap_or_else(|e| e.into_inner()) = entries.clone();
                if let Some(d) = &self.diagnostics {
                    d.queried(&entries);
                }
                entries
            }
            Err(e) => {
                let err = unavailable(e);
                warn!("Failed to load leaderboard, using last known list: {}", err);
                self.report_failure(StoreOperation::Query, &err);
                let mut fallback = self.last_known();
                fallback.truncate(limit);
                fallback
            }
        }
    }

    /// `query_top` with the configured default limit
    pub fn top(&self) -> Vec<LeaderboardEntry> {
        self.query_top(self.default_limit)
    }

    /// Last list fetched successfully
    pub fn last_known(&self) -> Vec<LeaderboardEntry> {
        self.last_known
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub(crate) fn watch(&self) -> Result<ChangeFeed> {
        self.backend.watch().map_err(|e| {
            let err = unavailable(e);
            warn!("Failed to open leaderboard change feed: {}", err);
            self.report_failure(StoreOperation::Watch, &err);
            err
        })
    }

    pub(crate) fn unwatch(&self, id: WatchId) {
        self.backend.unwatch(id);
    }

    fn report_failure(&self, operation: StoreOperation, error: &Error) {
        if let Some(d) = &self.diagnostics {
            d.failed(operation, error);
        }
    }
}

/// Classify a backend failure as the store being unavailable
fn unavailable(error: Error) -> Error {
    match error {
        Error::StoreUnavailable(_) => error,
        other => Error::StoreUnavailable(other.to_string()),
    }
}
