//! # flash-client — Flash Decision Trainer Client
//!
//! Client side of a timed trading-decision trainer: the user is shown a
//! candlestick chart, has a few seconds to answer buy / sell / skip, and the
//! backend scores each answer.
//!
//! ## Architecture Overview
//!
//! ```text
//!  ┌──────────────┐  Decision (mpsc)   ┌──────────────────┐   Request    ┌────────────┐
//!  │  Driver /    │ ─────────────────▶ │  SessionEngine   │ ───────────▶ │ ApiGateway │──▶ Transport ──▶ backend
//!  │  UI          │ ◀───────────────── │  + IterationTimer│              │            │
//!  └──────────────┘  SessionEvent      └──────────────────┘              └────────────┘
//!                    (broadcast)               ▲ 1s ticks                      │
//!                                       engine::runner                 AppState (Arc)
//!                                                                   ├─ AuthTokenStore
//!                                                                   └─ ErrorSink
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod error_sink;
pub mod events;
pub mod models;
pub mod state;

#[cfg(test)]
mod testing;
