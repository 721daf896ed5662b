//! Match reward and completion time bonus.

use serde::{Deserialize, Serialize};

use crate::config::scoring::{MATCH_REWARD, TIME_BONUS_CEILING_SECS};

/// Stateless scoring rules applied by the round state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    match_reward: u32,
    time_bonus_ceiling: u32,
}

impl ScoringPolicy {
    pub fn new(match_reward: u32, time_bonus_ceiling: u32) -> Self {
        Self {
            match_reward,
            time_bonus_ceiling,
        }
    }

    /// Flat reward for one matched pair
    pub fn match_reward(&self) -> u32 {
        self.match_reward
    }

    /// Bonus for finishing quickly: `max(0, ceiling - elapsed)`
    pub fn time_bonus(&self, elapsed_seconds: u64) -> u32 {
        let ceiling = u64::from(self.time_bonus_ceiling);
        ceiling.saturating_sub(elapsed_seconds) as u32
    }

    pub fn final_score(&self, score: u32, elapsed_seconds: u64) -> u32 {
        score.saturating_add(self.time_bonus(elapsed_seconds))
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::new(MATCH_REWARD, TIME_BONUS_CEILING_SECS)
    }
}
