//! In-process leaderboard table.
//!
//! Keeps rows in memory and broadcasts change events to every open watch.
//! Used for session-only leaderboards and as a test double; the availability
//! switch lets tests simulate an unreachable store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};

use super::backend::{ChangeEvent, ChangeFeed, LeaderboardBackend, WatchId};
use super::{EntryId, LeaderboardEntry, NewEntry, sort_ranked};

#[derive(Debug, Default)]
pub struct InMemoryBackend {
    rows: Mutex<Vec<LeaderboardEntry>>,
    watchers: Mutex<HashMap<WatchId, Sender<ChangeEvent>>>,
    next_watch: AtomicU64,
    unavailable: AtomicBool,
    insert_calls: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail as if the store could not be reached
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of insert requests received (single and batch)
    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        lock(&self.rows).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.rows).is_empty()
    }

    /// All rows in insertion order
    pub fn rows(&self) -> Vec<LeaderboardEntry> {
        lock(&self.rows).clone()
    }

    pub fn watcher_count(&self) -> usize {
        lock(&self.watchers).len()
    }

    /// Delete a row, returning whether it existed
    pub fn remove(&self, id: &EntryId) -> Result<bool> {
        self.check_available()?;
        let removed = {
            let mut rows = lock(&self.rows);
            let before = rows.len();
            rows.retain(|row| &row.id != id);
            rows.len() != before
        };
        if removed {
            self.broadcast(ChangeEvent::Deleted);
        }
        Ok(removed)
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::StoreUnavailable("in-memory store switched off".to_string()));
        }
        Ok(())
    }

    fn store_row(&self, entry: &NewEntry) -> LeaderboardEntry {
        let row = LeaderboardEntry::from_new(
            EntryId::new(Uuid::new_v4().to_string()),
            entry,
            Utc::now(),
        );
        lock(&self.rows).push(row.clone());
        row
    }

    fn broadcast(&self, event: ChangeEvent) {
        let mut watchers = lock(&self.watchers);
        // Drop watchers whose receiving side is gone
        watchers.retain(|id, sender| {
            let alive = sender.send(event).is_ok();
            if !alive {
                debug!("Dropping closed watch {:?}", id);
            }
            alive
        });
    }
}

impl LeaderboardBackend for InMemoryBackend {
    fn insert_one(&self, entry: &NewEntry) -> Result<LeaderboardEntry> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        let row = self.store_row(entry);
        self.broadcast(ChangeEvent::Inserted);
        Ok(row)
    }

    fn insert_many(&self, entries: &[NewEntry]) -> Result<usize> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        for entry in entries {
            self.store_row(entry);
        }
        if !entries.is_empty() {
            self.broadcast(ChangeEvent::Inserted);
        }
        Ok(entries.len())
    }

    fn query_ordered(&self, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        self.check_available()?;
        let mut rows = lock(&self.rows).clone();
        sort_ranked(&mut rows);
        rows.truncate(limit);
        Ok(rows)
    }

    fn watch(&self) -> Result<ChangeFeed> {
        self.check_available()?;
        let id = WatchId(self.next_watch.fetch_add(1, Ordering::SeqCst));
        let (sender, events) = mpsc::channel();
        lock(&self.watchers).insert(id, sender);
        Ok(ChangeFeed { id, events })
    }

    fn unwatch(&self, id: WatchId) {
        lock(&self.watchers).remove(&id);
    }
}
