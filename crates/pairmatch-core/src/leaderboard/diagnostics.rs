//! Optional observer for leaderboard store activity.
//!
//! Passed into `LeaderboardStore` at construction so operators and tests can
//! inspect what the store sees without reaching into shared globals.

use std::sync::Mutex;

use strum::IntoStaticStr;

use crate::error::Error;

use super::LeaderboardEntry;

/// Store operation that a diagnostic notification refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
pub enum StoreOperation {
    Insert,
    InsertMany,
    Query,
    Watch,
}

impl StoreOperation {
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// Receives store notifications; every method defaults to doing nothing
pub trait LeaderboardDiagnostics: Send + Sync {
    fn inserted(&self, _entry: &LeaderboardEntry) {}

    fn batch_inserted(&self, _count: usize) {}

    fn queried(&self, _entries: &[LeaderboardEntry]) {}

    fn failed(&self, _operation: StoreOperation, _error: &Error) {}
}

/// Diagnostics that remember the latest activity
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    state: Mutex<Recorded>,
}

#[derive(Debug, Default, Clone)]
pub struct Recorded {
    pub inserts: usize,
    pub queries: usize,
    pub last_inserted: Option<LeaderboardEntry>,
    pub last_snapshot: Vec<LeaderboardEntry>,
    pub failures: Vec<(StoreOperation, String)>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Recorded {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn update(&self, f: impl FnOnce(&mut Recorded)) {
        f(&mut self.state.lock().unwrap_or_else(|e| e.into_inner()));
    }
}

impl LeaderboardDiagnostics for RecordingDiagnostics {
    fn inserted(&self, entry: &LeaderboardEntry) {
        self.update(|r| {
            r.inserts += 1;
            r.last_inserted = Some(entry.clone());
        });
    }

    fn batch_inserted(&self, count: usize) {
        self.update(|r| r.inserts += count);
    }

    fn queried(&self, entries: &[LeaderboardEntry]) {
        self.update(|r| {
            r.queries += 1;
            r.last_snapshot = entries.to_vec();
        });
    }

    fn failed(&self, operation: StoreOperation, error: &Error) {
        self.update(|r| r.failures.push((operation, error.to_string())));
    }
}
