//! # models::decision

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The user's answer to one chart.  `Skip` is also what the countdown forces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Buy,
    Sell,
    Skip,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Buy  => write!(f, "buy"),
            Decision::Sell => write!(f, "sell"),
            Decision::Skip => write!(f, "skip"),
        }
    }
}

/// Body of `POST /sessions/{mode}/{id}/decisions/{n}`.
///
/// `time_spent_seconds` never exceeds the session's `timer_seconds`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub session_id:         Uuid,
    pub iteration_num:      u32,
    pub decision:           Decision,
    pub time_spent_seconds: u32,
}

/// Backend acknowledgement for a recorded decision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionAck {
    /// P&L of the decision after slippage, when the backend reports it.
    #[serde(default)]
    pub result_final: Option<f64>,
}
