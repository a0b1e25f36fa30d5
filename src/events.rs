//! # events
//!
//! Defines [`SessionEvent`], everything the session engine announces while a
//! session runs.  The presentation layer subscribes through
//! `tokio::sync::broadcast` and redraws from these.

use serde::Serialize;
use uuid::Uuid;

use crate::engine::Phase;
use crate::error::ApiError;
use crate::models::{Decision, DecisionRecord, SessionResults};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionEvent {
    PhaseChanged {
        from: Phase,
        to:   Phase,
    },

    /// Backend accepted the config and returned a handle.
    SessionCreated {
        session_id:       Uuid,
        iterations_count: u32,
    },

    /// A chart is on screen and its countdown is running.
    IterationStarted {
        iteration_num: u32,
        timer_seconds: u32,
    },

    TimerTick {
        iteration_num: u32,
        remaining:     u32,
    },

    /// Out of time: a `skip` is about to be submitted.
    TimerExpired {
        iteration_num: u32,
    },

    DecisionSubmitted {
        record:       DecisionRecord,
        result_final: Option<f64>,
    },

    /// A decision could not be submitted and is waiting for `retry()`.
    DecisionPending {
        iteration_num: u32,
        decision:      Decision,
    },

    SessionCompleted {
        results: Box<SessionResults>,
    },

    RequestFailed {
        error: ApiError,
    },
}

impl SessionEvent {
    #[inline]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"event":"SERIALIZATION_ERROR"}"#.to_string())
    }
}
