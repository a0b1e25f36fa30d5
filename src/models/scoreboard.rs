//! # models::scoreboard
//!
//! Read-only view of the backend's rankings.  Every part may be missing when
//! nobody (or not this user) has finished a session in the mode yet.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::session::SessionMode;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scoreboard {
    #[serde(default)]
    pub top_users:         Option<BTreeMap<u32, TopUserRecord>>,
    #[serde(default)]
    pub user_mode_summary: Option<UserModeSummary>,
    #[serde(default)]
    pub user_rank:         Option<UserRank>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopUserRecord {
    pub mode:      SessionMode,
    pub user_name: String,
    pub result:    f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserModeSummary {
    pub mode:                  SessionMode,
    pub total_sessions:        u32,
    pub profitable_sessions:   u32,
    pub unprofitable_sessions: u32,
    pub total_result:          f64,
    pub median_result:         f64,
    pub best_session_result:   f64,
    pub first_session_date:    DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRank {
    pub mode: SessionMode,
    pub rank: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_scoreboard() {
        let board: Scoreboard = serde_json::from_str(
            r#"{"top_users":null,"user_mode_summary":null,"user_rank":null}"#,
        )
        .unwrap();
        assert_eq!(board, Scoreboard::default());
    }

    #[test]
    fn test_ranked_records_keep_order() {
        let board: Scoreboard = serde_json::from_value(serde_json::json!({
            "top_users": {
                "2": {"mode": "classic", "user_name": "bob",   "result": 3.5},
                "1": {"mode": "classic", "user_name": "alice", "result": 9.0}
            },
            "user_rank": {"mode": "classic", "rank": 2}
        }))
        .unwrap();

        let names: Vec<_> = board.top_users.unwrap().into_values().map(|r| r.user_name).collect();
        assert_eq!(names, vec!["alice", "bob"]);
        assert_eq!(board.user_rank.map(|r| r.rank), Some(2));
    }
}
