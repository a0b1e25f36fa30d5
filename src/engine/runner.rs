//! # engine::runner
//!
//! Feeds a [`SessionEngine`] one tick per second plus the user's decisions
//! until the session is over.
//!
//! ## Flow
//! ```text
//! loop:
//!   select!
//!     interval tick   → engine.tick()            (expiry ⇒ forced skip)
//!     decision rx     → engine.record_decision() (or retry() if something is pending)
//!   iteration changed → reset interval so the new countdown starts on a clean second
//! ```
//!
//! Recoverable errors are logged and the loop keeps going; the next decision
//! sent by the user acts as the retry signal.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};

use super::{Phase, SessionEngine};
use crate::models::Decision;

const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Failed,
    /// The decision channel closed, or the engine had no session to run.
    Stopped,
}

pub async fn run_session(engine: &mut SessionEngine, mut decisions: mpsc::Receiver<Decision>) -> RunOutcome {
    if engine.phase() == Phase::Configuring {
        warn!("run_session called before a session was created");
        return RunOutcome::Stopped;
    }

    let mut ticker = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut current = engine.iteration_num();

    loop {
        match engine.phase() {
            Phase::Completed => return RunOutcome::Completed,
            Phase::Failed => return RunOutcome::Failed,
            _ => {}
        }

        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = engine.tick().await {
                    warn!(error = %e, phase = ?engine.phase(), "Tick handling failed");
                }
            }
            received = decisions.recv() => {
                let Some(decision) = received else {
                    info!("Decision channel closed — stopping session runner");
                    return RunOutcome::Stopped;
                };

                let result = if engine.can_retry() {
                    engine.retry().await
                } else {
                    engine.record_decision(decision).await
                };

                if let Err(e) = result {
                    warn!(error = %e, phase = ?engine.phase(), "Decision handling failed");
                }
            }
        }

        let now_on = engine.iteration_num();
        if now_on != current && now_on != 0 {
            current = now_on;
            ticker.reset();
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
