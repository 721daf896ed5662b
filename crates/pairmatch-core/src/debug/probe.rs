//! Manual leaderboard probe

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::leaderboard::{LeaderboardEntry, LeaderboardStore, NewEntry, PlayerName};

/// Time recorded for seeded rows, in seconds
const SEEDED_TIME_SECONDS: u32 = 60;
/// Moves recorded for seeded rows
const SEEDED_MOVES: u32 = 10;

/// Snapshot of the ranking as the probe saw it
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub limit: usize,
    pub count: usize,
    pub entries: Vec<LeaderboardEntry>,
}

pub struct LeaderboardProbe {
    store: Arc<LeaderboardStore>,
}

impl LeaderboardProbe {
    pub fn new(store: Arc<LeaderboardStore>) -> Self {
        Self { store }
    }

    /// Fetch the current top list
    pub fn get(&self) -> ProbeReport {
        let limit = self.store.default_limit();
        let entries = self.store.query_top(limit);
        ProbeReport {
            limit,
            count: entries.len(),
            entries,
        }
    }

    /// Insert a test row with fixed time and moves
    pub fn add(&self, name: &str, score: u32) -> Result<LeaderboardEntry> {
        let player = PlayerName::parse(name)?;
        let entry = NewEntry::new(player, score, SEEDED_TIME_SECONDS, SEEDED_MOVES);
        let row = self.store.insert(&entry)?;
        info!("Seeded leaderboard row {} ({} pts)", row.id, row.score);
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::InMemoryBackend;

    fn probe() -> (Arc<InMemoryBackend>, LeaderboardProbe) {
        let backend = Arc::new(InMemoryBackend::new());
        let store = Arc::new(LeaderboardStore::new(backend.clone()));
        (backend, LeaderboardProbe::new(store))
    }

    #[test]
    fn test_add_uses_fixed_time_and_moves() {
        let (backend, probe) = probe();
        let row = probe.add("Tester", 420).unwrap();

        assert_eq!(row.time_seconds, 60);
        assert_eq!(row.moves, 10);
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn test_add_rejects_blank_name() {
        let (backend, probe) = probe();
        assert!(probe.add("  ", 10).is_err());
        assert!(backend.is_empty());
    }

    #[test]
    fn test_get_reports_ranking() {
        let (_, probe) = probe();
        probe.add("low", 10).unwrap();
        probe.add("high", 900).unwrap();

        let report = probe.get();
        assert_eq!(report.count, 2);
        assert_eq!(report.limit, 10);
        assert_eq!(report.entries[0].player_name.as_str(), "high");
    }
}
