//! # engine
//!
//! The session orchestration core: the per-iteration countdown
//! ([`timer`]), the session state machine ([`session`]) and the loop that
//! feeds it ticks and decisions ([`runner`]).

use serde::Serialize;

pub mod runner;
pub mod session;
pub mod timer;

pub use runner::{run_session, RunOutcome};
pub use session::SessionEngine;
pub use timer::{IterationTimer, TimerEvent, TimerState};

/// Where a [`SessionEngine`] is in a session's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Configuring,
    Creating,
    IterationActive,
    IterationSubmitting,
    Completing,
    Completed,
    /// Unrecoverable API failure; only `abandon()` leaves this phase.
    Failed,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed | Phase::Failed)
    }
}
