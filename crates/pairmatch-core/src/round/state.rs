use std::fmt;

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::deck::CardId;

/// Identity of one round; changes on every restart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoundId(pub u64);

impl RoundId {
    pub fn next(self) -> Self {
        RoundId(self.0 + 1)
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Two revealed cards waiting for the settle delay to elapse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingResolution {
    pub round: RoundId,
    pub first: CardId,
    pub second: CardId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr)]
pub enum RoundPhase {
    /// No deck dealt yet
    Idle,
    Playing,
    /// Two cards face up, waiting on the settle delay
    Evaluating(PendingResolution),
    Completed,
}

impl RoundPhase {
    pub fn name(&self) -> &'static str {
        self.into()
    }

    pub fn is_evaluating(&self) -> bool {
        matches!(self, RoundPhase::Evaluating(_))
    }
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of an accepted flip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipOutcome {
    /// First card of a pair is face up
    Revealed,
    /// Second card is face up; resolution must be scheduled
    Evaluating(PendingResolution),
}
