//! Play session: one active round wired to timing and persistence.

mod orchestrator;
mod settle;

pub use orchestrator::{OrchestratorBuilder, RoundOrchestrator, SessionEvent};
pub use settle::SettleTask;
