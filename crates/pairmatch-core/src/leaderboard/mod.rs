//! Shared leaderboard: entries, store, change notifications and formatting.

pub mod backend;
pub mod diagnostics;
mod entry;
pub mod format;
mod memory;
mod notifier;
mod store;

pub use backend::{ChangeEvent, ChangeFeed, LeaderboardBackend, WatchId};
pub use diagnostics::{LeaderboardDiagnostics, RecordingDiagnostics, StoreOperation};
pub use entry::{
    EntryId, LeaderboardEntry, NewEntry, PlayerName, rank_order, sort_ranked, uniform_batch,
};
pub use memory::InMemoryBackend;
pub use notifier::{LeaderboardNotifier, Subscription};
pub use store::LeaderboardStore;
