//! # models::session
//!
//! Session-level data: the configuration a user submits, the handle the
//! backend returns, the options offered for the configuration form, one
//! iteration's chart and local state, and the aggregated results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::decision::Decision;

// ─── Mode ─────────────────────────────────────────────────────────────────────

/// Game mode.  Every session route is scoped by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Classic,
    Blitz,
    Crypto,
    Custom,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::Classic => "classic",
            SessionMode::Blitz   => "blitz",
            SessionMode::Crypto  => "crypto",
            SessionMode::Custom  => "custom",
        }
    }
}

impl std::fmt::Display for SessionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SessionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "classic" => Ok(SessionMode::Classic),
            "blitz"   => Ok(SessionMode::Blitz),
            "crypto"  => Ok(SessionMode::Crypto),
            "custom"  => Ok(SessionMode::Custom),
            other => Err(format!("unknown session mode '{other}'")),
        }
    }
}

// ─── Configuration ────────────────────────────────────────────────────────────

/// Everything the user picks before a session starts.  Immutable once sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub mode:             SessionMode,
    /// Market name as offered by the options endpoint, e.g. `"Shares"`.
    pub market:           String,
    pub ticker:           String,
    /// Bar timeframe, e.g. `"M1"` or `"1day"`.
    pub timeframe:        String,
    /// How many bars each chart shows.
    pub bars_number:      u32,
    /// Per-iteration countdown.
    pub timer_seconds:    u32,
    #[serde(default)]
    pub start_datetime:   Option<DateTime<Utc>>,
    pub iterations_count: u32,
    /// Commission imitation as a fraction, `0.001` = 0.1%.
    pub slippage:         f64,
    /// Bar on which the decision result is fixed.
    pub fixing_bar:       u32,
}

/// Choices offered for building a [`SessionConfig`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionOptions {
    #[serde(default)]
    pub tickers:     Vec<TickerOption>,
    #[serde(default)]
    pub timeframes:  Vec<String>,
    #[serde(default)]
    pub bars_numbers: Vec<u32>,
    #[serde(default)]
    pub time_limits: Vec<u32>,
    #[serde(default)]
    pub iterations:  Vec<u32>,
    #[serde(default)]
    pub slippages:   Vec<f64>,
    #[serde(default)]
    pub fixing_bars: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerOption {
    pub ticker: String,
    #[serde(default)]
    pub name:   String,
}

// ─── Handle ───────────────────────────────────────────────────────────────────

/// Backend-owned session lifecycle.  The client only observes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
    Abandoned,
}

/// What `POST /sessions/{mode}` returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionHandle {
    pub session_id: Uuid,
    pub status:     SessionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "super::id::string_or_number")]
    pub user_id:    String,
    pub config:     SessionConfig,
}

// ─── Iteration ────────────────────────────────────────────────────────────────

/// Response of `GET /sessions/{mode}/{id}/iterations/{n}`.
///
/// The chart itself is rendered elsewhere, so it is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationChart {
    pub iteration_num: u32,
    #[serde(default)]
    pub chart:         serde_json::Value,
}

/// Local state of the iteration currently on screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationState {
    pub session_id:        Uuid,
    /// 1-based, strictly increasing within a session.
    pub iteration_num:     u32,
    pub chart:             serde_json::Value,
    pub remaining_seconds: u32,
    /// `None` until the user decides or the countdown forces a skip.
    pub decision:          Option<Decision>,
}

// ─── Results ──────────────────────────────────────────────────────────────────

/// Aggregated outcome of a finished session, computed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResults {
    pub session_id:              Uuid,
    pub mode:                    SessionMode,
    pub total_decisions:         u32,
    pub profitable_decisions:    u32,
    pub unprofitable_decisions:  u32,
    pub skipped_decisions:       u32,
    pub total_result:            f64,
    pub median_decisions_result: f64,
    pub best_decisions_result:   f64,
    pub worst_decisions_result:  f64,
    pub total_time_spent:        f64,
}
