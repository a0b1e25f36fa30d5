//! Domain models shared across the whole client: what the backend sends us,
//! what we send back, and what the session engine keeps in between.

pub mod decision;
mod id;
pub mod identity;
pub mod scoreboard;
pub mod session;

pub use decision::{Decision, DecisionAck, DecisionRecord};
pub use identity::{Credentials, Identity, SignUp};
pub use scoreboard::{Scoreboard, TopUserRecord, UserModeSummary, UserRank};
pub use session::{
    IterationChart, IterationState, SessionConfig, SessionHandle, SessionMode, SessionOptions,
    SessionResults, SessionStatus, TickerOption,
};
