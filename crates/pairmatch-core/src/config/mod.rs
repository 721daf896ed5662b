//! Game configuration and tuning constants.
//!
//! This module contains:
//! - `GameConfig` - symbol set, timing and scoring knobs for a play session
//! - Scoring, timing, leaderboard and player-name constants

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::deck::Symbol;
use crate::error::{Error, Result};
use crate::scoring::ScoringPolicy;

/// Scoring configuration.
pub mod scoring {
    /// Points awarded for every matched pair.
    pub const MATCH_REWARD: u32 = 100;

    /// Completion time bonus is `TIME_BONUS_CEILING_SECS - elapsed`, floored at zero.
    pub const TIME_BONUS_CEILING_SECS: u32 = 300;
}

/// Round timing configuration.
pub mod timing {
    /// How long two revealed cards stay visible before they are resolved.
    pub const SETTLE_DELAY_MS: u64 = 1000;
}

/// Leaderboard configuration.
pub mod leaderboard {
    /// Number of entries shown in the ranking when no limit is given.
    pub const DEFAULT_LIMIT: usize = 10;
}

/// Player name constraints.
pub mod player {
    /// Maximum length of a player name, counted in characters after trimming.
    pub const MAX_NAME_CHARS: usize = 20;
}

/// Symbols used when the configuration does not provide any.
pub const DEFAULT_SYMBOLS: [&str; 8] = ["🐶", "🐱", "🐰", "🐸", "🦊", "🐷", "🐯", "🐻"];

/// Configuration for a play session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Distinct card faces; one pair is dealt per symbol
    pub symbols: Vec<String>,
    pub settle_delay_ms: u64,
    pub match_reward: u32,
    pub time_bonus_ceiling: u32,
    pub leaderboard_limit: usize,
    /// Fixed shuffle seed, for reproducible decks
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            settle_delay_ms: timing::SETTLE_DELAY_MS,
            match_reward: scoring::MATCH_REWARD,
            time_bonus_ceiling: scoring::TIME_BONUS_CEILING_SECS,
            leaderboard_limit: leaderboard::DEFAULT_LIMIT,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Check the configuration before a session is built from it
    pub fn validate(&self) -> Result<()> {
        if self.symbols.is_empty() {
            return Err(Error::InvalidConfig(
                "symbol set must contain at least one symbol".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for symbol in &self.symbols {
            if !seen.insert(symbol.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "symbol {:?} appears more than once",
                    symbol
                )));
            }
        }

        if self.leaderboard_limit == 0 {
            return Err(Error::InvalidConfig(
                "leaderboard_limit must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    pub fn symbol_set(&self) -> Vec<Symbol> {
        self.symbols.iter().map(|s| Symbol::new(s.as_str())).collect()
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn scoring(&self) -> ScoringPolicy {
        ScoringPolicy::new(self.match_reward, self.time_bonus_ceiling)
    }

    pub fn total_pairs(&self) -> usize {
        self.symbols.len()
    }
}
