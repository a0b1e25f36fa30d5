//! # engine::session
//!
//! **Session Engine** — drives one training session from configuration to
//! results.
//!
//! ## Phases
//!
//! ```text
//! Configuring ─create_session─▶ Creating ─▶ IterationActive ◀──────────────┐
//!      ▲                           │              │ record_decision / expiry │
//!      │ (recoverable failure)     │              ▼                          │
//!      └───────────────────────────┘     IterationSubmitting ───next n──────┘
//!                                                 │ last n
//!                                                 ▼
//!                                            Completing ─▶ Completed
//!
//!  Unauthorized / NotFound / InvalidPayload from any call ─▶ Failed
//! ```
//!
//! ## Rules
//!
//! * Nothing is mutated optimistically: a failed create keeps no handle, a
//!   failed submit keeps the iteration open with its decision pending.
//! * The timer is never restarted after a failure.  The caller retries
//!   explicitly with [`SessionEngine::retry`].
//! * `IterationSubmitting` is a real phase, so a second decision for the
//!   same iteration is rejected instead of double-submitted.

use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::timer::{IterationTimer, TimerEvent};
use super::Phase;
use crate::api::ApiGateway;
use crate::error::{ApiError, EngineError};
use crate::events::SessionEvent;
use crate::models::{
    Decision, DecisionRecord, IterationState, SessionConfig, SessionHandle, SessionMode, SessionResults,
};

const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// What `retry()` has to redo after the backend already accepted a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resume {
    LoadIteration(u32),
    FetchResults,
}

/// The config the user submitted together with the backend's handle.
#[derive(Debug, Clone)]
struct ActiveSession {
    config: SessionConfig,
    handle: SessionHandle,
}

impl ActiveSession {
    fn mode(&self) -> SessionMode {
        self.config.mode
    }

    fn session_id(&self) -> Uuid {
        self.handle.session_id
    }
}

// ─── Engine ───────────────────────────────────────────────────────────────────

pub struct SessionEngine {
    gateway:   ApiGateway,
    phase:     Phase,
    session:   Option<ActiveSession>,
    iteration: Option<IterationState>,
    timer:     IterationTimer,
    /// Time spent recorded for a decision whose submission failed.
    pending:   Option<u32>,
    resume:    Option<Resume>,
    submitted: Vec<DecisionRecord>,
    results:   Option<SessionResults>,
    events_tx: broadcast::Sender<SessionEvent>,
}

impl SessionEngine {
    pub fn new(gateway: ApiGateway) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            gateway,
            phase:     Phase::Configuring,
            session:   None,
            iteration: None,
            timer:     IterationTimer::new(),
            pending:   None,
            resume:    None,
            submitted: Vec::new(),
            results:   None,
            events_tx,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn gateway(&self) -> &ApiGateway {
        &self.gateway
    }

    pub fn config(&self) -> Option<&SessionConfig> {
        self.session.as_ref().map(|s| &s.config)
    }

    pub fn handle(&self) -> Option<&SessionHandle> {
        self.session.as_ref().map(|s| &s.handle)
    }

    pub fn iteration(&self) -> Option<&IterationState> {
        self.iteration.as_ref()
    }

    /// Number of the iteration on screen, `0` when there is none.
    pub fn iteration_num(&self) -> u32 {
        self.iteration.as_ref().map(|i| i.iteration_num).unwrap_or(0)
    }

    pub fn timer(&self) -> &IterationTimer {
        &self.timer
    }

    /// Every decision the backend acknowledged, in submission order.
    pub fn submitted(&self) -> &[DecisionRecord] {
        &self.submitted
    }

    pub fn results(&self) -> Option<&SessionResults> {
        self.results.as_ref()
    }

    /// Whether [`retry`](Self::retry) has something to do.
    pub fn can_retry(&self) -> bool {
        match self.phase {
            Phase::IterationActive     => self.pending.is_some(),
            Phase::IterationSubmitting => matches!(self.resume, Some(Resume::LoadIteration(_))),
            Phase::Completing          => true,
            _ => false,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events_tx.subscribe()
    }

    // ── Operations ────────────────────────────────────────────────────────────

    /// Validate `config`, create the session and open iteration 1.
    pub async fn create_session(&mut self, config: SessionConfig) -> Result<(), EngineError> {
        self.expect_phase(Phase::Configuring)?;
        validate_config(&config)?;

        self.set_phase(Phase::Creating);

        // ── 1. Create on the backend ─────────────────────────────────────────
        let handle = match self.gateway.create_session(&config).await {
            Ok(handle) => handle,
            Err(e) => return Err(self.fail(e, Phase::Configuring)),
        };

        info!(
            session_id = %handle.session_id,
            mode       = %config.mode,
            ticker     = %config.ticker,
            iterations = config.iterations_count,
            timer_secs = config.timer_seconds,
            "📈 Session created"
        );

        // ── 2. First chart; without it the session is not usable ─────────────
        let chart = match self.gateway.fetch_iteration(config.mode, handle.session_id, 1).await {
            Ok(chart) => chart,
            Err(e) => return Err(self.fail(e, Phase::Configuring)),
        };

        // announced only once the session is usable
        self.emit(SessionEvent::SessionCreated {
            session_id:       handle.session_id,
            iterations_count: config.iterations_count,
        });

        self.session = Some(ActiveSession { config, handle });
        self.submitted.clear();
        self.results = None;
        self.start_iteration(1, chart.chart);
        Ok(())
    }

    /// The user's choice for the iteration on screen.
    pub async fn record_decision(&mut self, decision: Decision) -> Result<(), EngineError> {
        self.expect_phase(Phase::IterationActive)?;

        let iteration_num = self.iteration_num();
        if self.pending.is_some() {
            return Err(EngineError::DecisionPending { iteration_num });
        }

        self.timer.cancel();
        let time_spent = self.timer.time_spent();

        debug!(iteration_num, %decision, time_spent, "Decision taken");
        self.submit(decision, time_spent).await
    }

    /// Deliver one second to the running countdown.
    ///
    /// On expiry a `skip` is submitted with the full time limit as time spent.
    /// Outside `IterationActive` ticks are ignored.
    pub async fn tick(&mut self) -> Result<Option<TimerEvent>, EngineError> {
        if self.phase != Phase::IterationActive {
            return Ok(None);
        }

        let iteration_num = self.iteration_num();

        match self.timer.tick() {
            None => Ok(None),
            Some(TimerEvent::Tick { remaining }) => {
                if let Some(iteration) = self.iteration.as_mut() {
                    iteration.remaining_seconds = remaining;
                }
                self.emit(SessionEvent::TimerTick { iteration_num, remaining });
                Ok(Some(TimerEvent::Tick { remaining }))
            }
            Some(TimerEvent::Expired) => {
                if let Some(iteration) = self.iteration.as_mut() {
                    iteration.remaining_seconds = 0;
                }
                warn!(iteration_num, "⏰ Out of time — forcing skip");
                self.emit(SessionEvent::TimerExpired { iteration_num });

                self.submit(Decision::Skip, self.timer.duration()).await?;
                Ok(Some(TimerEvent::Expired))
            }
        }
    }

    /// Redo the step that failed last: resubmit a pending decision, load the
    /// next iteration, or fetch the results.
    pub async fn retry(&mut self) -> Result<(), EngineError> {
        match (self.phase, self.resume) {
            (Phase::IterationActive, _) => {
                let (Some(time_spent), Some(decision)) = (self.pending, self.pending_decision()) else {
                    return Err(EngineError::NothingToRetry(self.phase));
                };
                info!(iteration_num = self.iteration_num(), %decision, "🔁 Resubmitting decision");
                self.submit(decision, time_spent).await
            }
            (Phase::IterationSubmitting, Some(Resume::LoadIteration(n))) => {
                info!(iteration_num = n, "🔁 Reloading iteration");
                self.load_iteration(n).await
            }
            (Phase::Completing, _) => {
                info!("🔁 Refetching session results");
                self.finish().await
            }
            (phase, _) => Err(EngineError::NothingToRetry(phase)),
        }
    }

    /// Drop the current session locally and go back to `Configuring`.
    ///
    /// The backend marks an unfinished session abandoned on its own.
    pub fn abandon(&mut self) {
        self.timer.cancel();
        if let Some(session) = self.session.take() {
            info!(session_id = %session.session_id(), "Session abandoned");
        }
        self.iteration = None;
        self.pending = None;
        self.resume = None;
        self.submitted.clear();
        self.results = None;
        self.set_phase(Phase::Configuring);
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn start_iteration(&mut self, iteration_num: u32, chart: serde_json::Value) {
        let Some(session) = self.session.as_ref() else { return };
        let timer_seconds = session.config.timer_seconds;
        let iterations_count = session.config.iterations_count;

        self.timer = IterationTimer::started(timer_seconds);
        self.iteration = Some(IterationState {
            session_id:        session.session_id(),
            iteration_num,
            chart,
            remaining_seconds: timer_seconds,
            decision:          None,
        });
        self.pending = None;
        self.resume = None;

        self.set_phase(Phase::IterationActive);
        self.emit(SessionEvent::IterationStarted { iteration_num, timer_seconds });
        info!(
            iteration_num,
            of = iterations_count,
            timer_secs = timer_seconds,
            "🕯️ Iteration started"
        );
    }

    async fn submit(&mut self, decision: Decision, time_spent: u32) -> Result<(), EngineError> {
        let (Some(session), Some(iteration)) = (self.session.as_ref(), self.iteration.as_mut()) else {
            return Err(EngineError::InvalidPhase { expected: Phase::IterationActive, actual: self.phase });
        };

        iteration.decision = Some(decision);
        let mode = session.mode();
        let iterations_count = session.config.iterations_count;
        let record = DecisionRecord {
            session_id:         session.session_id(),
            iteration_num:      iteration.iteration_num,
            decision,
            time_spent_seconds: time_spent.min(session.config.timer_seconds),
        };

        self.set_phase(Phase::IterationSubmitting);

        let ack = match self.gateway.record_decision(mode, &record).await {
            Ok(ack) => ack,
            Err(e) => {
                self.pending = Some(record.time_spent_seconds);
                self.emit(SessionEvent::DecisionPending { iteration_num: record.iteration_num, decision });
                return Err(self.fail(e, Phase::IterationActive));
            }
        };

        info!(
            iteration_num = record.iteration_num,
            decision      = %record.decision,
            time_spent    = record.time_spent_seconds,
            result_final  = ?ack.result_final,
            "✅ Decision recorded"
        );

        self.pending = None;
        self.iteration = None;
        self.submitted.push(record.clone());
        let done = record.iteration_num;
        self.emit(SessionEvent::DecisionSubmitted { record, result_final: ack.result_final });

        if done >= iterations_count {
            self.resume = Some(Resume::FetchResults);
            self.set_phase(Phase::Completing);
            self.finish().await
        } else {
            self.resume = Some(Resume::LoadIteration(done + 1));
            self.load_iteration(done + 1).await
        }
    }

    async fn load_iteration(&mut self, iteration_num: u32) -> Result<(), EngineError> {
        let Some(session) = self.session.as_ref() else {
            return Err(EngineError::NothingToRetry(self.phase));
        };

        match self.gateway.fetch_iteration(session.mode(), session.session_id(), iteration_num).await {
            Ok(chart) => {
                if chart.iteration_num != iteration_num {
                    warn!(expected = iteration_num, got = chart.iteration_num, "Backend returned a different iteration number");
                }
                self.start_iteration(iteration_num, chart.chart);
                Ok(())
            }
            Err(e) => Err(self.fail(e, Phase::IterationSubmitting)),
        }
    }

    async fn finish(&mut self) -> Result<(), EngineError> {
        let Some(session) = self.session.as_ref() else {
            return Err(EngineError::NothingToRetry(self.phase));
        };

        match self.gateway.session_results(session.mode(), session.session_id()).await {
            Ok(results) => {
                info!(
                    session_id   = %results.session_id,
                    total_result = results.total_result,
                    decisions    = results.total_decisions,
                    "🏁 Session completed"
                );
                self.resume = None;
                self.results = Some(results.clone());
                self.set_phase(Phase::Completed);
                self.emit(SessionEvent::SessionCompleted { results: Box::new(results) });
                Ok(())
            }
            Err(e) => Err(self.fail(e, Phase::Completing)),
        }
    }

    fn pending_decision(&self) -> Option<Decision> {
        self.iteration.as_ref().and_then(|i| i.decision)
    }

    /// Move to `recover_to` (recoverable) or `Failed`, announce, and wrap.
    fn fail(&mut self, error: ApiError, recover_to: Phase) -> EngineError {
        let next = if error.kind.is_recoverable() { recover_to } else { Phase::Failed };
        self.set_phase(next);
        self.emit(SessionEvent::RequestFailed { error: error.clone() });
        EngineError::Api(error)
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), EngineError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(EngineError::InvalidPhase { expected, actual: self.phase })
        }
    }

    fn set_phase(&mut self, to: Phase) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        debug!(?from, ?to, "Phase changed");
        self.emit(SessionEvent::PhaseChanged { from, to });
    }

    fn emit(&self, event: SessionEvent) {
        // Err only means nobody is listening
        let _ = self.events_tx.send(event);
    }
}

fn validate_config(config: &SessionConfig) -> Result<(), EngineError> {
    if config.iterations_count < 1 {
        return Err(EngineError::InvalidConfig("iterations_count must be at least 1".into()));
    }
    if config.timer_seconds < 1 {
        return Err(EngineError::InvalidConfig("timer_seconds must be at least 1".into()));
    }
    Ok(())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
