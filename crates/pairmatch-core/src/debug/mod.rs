//! Debug utilities for inspecting the shared leaderboard
//!
//! Reads the current ranking and seeds test rows without playing a round.

mod probe;

pub use probe::{LeaderboardProbe, ProbeReport};
