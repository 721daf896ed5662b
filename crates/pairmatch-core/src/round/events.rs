use serde::{Deserialize, Serialize};

use crate::deck::{CardId, Symbol};

use super::RoundId;

/// Final figures of a completed round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionSummary {
    pub round: RoundId,
    /// Match points plus time bonus
    pub final_score: u32,
    pub time_bonus: u32,
    pub elapsed_seconds: u64,
    pub moves: u32,
}

/// Events emitted by the round state machine for presentation layers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundEvent {
    Matched {
        first: CardId,
        second: CardId,
        symbol: Symbol,
        /// Score after the reward was added
        score: u32,
    },
    Mismatched {
        first: CardId,
        second: CardId,
    },
    Completed(CompletionSummary),
}

impl RoundEvent {
    pub fn completion(&self) -> Option<&CompletionSummary> {
        match self {
            RoundEvent::Completed(summary) => Some(summary),
            _ => None,
        }
    }
}
