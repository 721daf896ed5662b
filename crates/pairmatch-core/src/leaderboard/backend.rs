//! Persistent store capability.
//!
//! The leaderboard layer consumes a table-like remote resource through this
//! trait. Implementations own transport, timeouts and serialization of
//! concurrent writes; the layer above only decides how failures surface.

use std::sync::mpsc::Receiver;

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::error::Result;

use super::{LeaderboardEntry, NewEntry};

/// Identifier of one open change feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WatchId(pub u64);

/// Kind of row change observed on the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr)]
pub enum ChangeEvent {
    Inserted,
    Updated,
    Deleted,
}

/// Stream of change events for one watcher
///
/// The feed ends (the receiver disconnects) once the backend releases the
/// watch.
#[derive(Debug)]
pub struct ChangeFeed {
    pub id: WatchId,
    pub events: Receiver<ChangeEvent>,
}

/// Remote leaderboard table
pub trait LeaderboardBackend: Send + Sync {
    /// Insert one row and return it as stored
    fn insert_one(&self, entry: &NewEntry) -> Result<LeaderboardEntry>;

    /// Insert several rows in one request, returning how many were written
    fn insert_many(&self, entries: &[NewEntry]) -> Result<usize>;

    /// Rows ordered by score descending, then time ascending
    fn query_ordered(&self, limit: usize) -> Result<Vec<LeaderboardEntry>>;

    /// Open a change feed on the table
    fn watch(&self) -> Result<ChangeFeed>;

    /// Release a change feed; unknown ids are ignored
    fn unwatch(&self, id: WatchId);
}
