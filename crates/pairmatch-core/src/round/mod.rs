//! Round state machine.
//!
//! A round moves `Idle → Playing → Evaluating → Playing … → Completed`.
//! Flips are synchronous; the match decision after two flips is applied by
//! `Round::resolve` once the settle delay has passed, which the session layer
//! schedules.

mod events;
mod machine;
mod state;

pub use events::{CompletionSummary, RoundEvent};
pub use machine::Round;
pub use state::{FlipOutcome, PendingResolution, RoundId, RoundPhase};
