//! Core of the pairmatch memory game.
//!
//! Deals shuffled decks, runs rounds card by card, scores them and keeps a
//! shared leaderboard that pushes fresh rankings to subscribers.

pub mod cache;
pub mod clock;
pub mod config;
#[cfg(feature = "debug-tools")]
pub mod debug;
pub mod deck;
pub mod error;
pub mod leaderboard;
pub mod migration;
pub mod round;
pub mod scoring;
pub mod session;

pub use cache::{FileCache, LocalCache, MemoryCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::GameConfig;
pub use deck::{Card, CardId, Symbol, generate_deck};
pub use error::{Error, Result};
pub use leaderboard::{
    EntryId, InMemoryBackend, LeaderboardBackend, LeaderboardEntry, LeaderboardNotifier,
    LeaderboardStore, NewEntry, PlayerName, Subscription,
};
pub use migration::{LegacyEntry, LegacyMigration, MigrationOutcome};
pub use round::{CompletionSummary, Round, RoundEvent, RoundId, RoundPhase};
pub use scoring::ScoringPolicy;
pub use session::{RoundOrchestrator, SessionEvent};
