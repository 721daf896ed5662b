//! CLI command implementations.
//!
//! This module contains the implementation of each CLI command.

pub mod debug;
pub mod leaderboard;
pub mod migrate;
pub mod play;
pub mod watch;
