//! Test-only helpers: a scripted [`Transport`] that records what it was sent,
//! and a fake backend built on it for engine tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::api::{ApiGateway, RawResponse, Request, Transport, TransportError};
use crate::auth::MemoryIdentityStorage;
use crate::engine::SessionEngine;
use crate::models::{DecisionRecord, Identity, SessionConfig, SessionMode};
use crate::state::build_state;

type Handler = Box<dyn Fn(&Request) -> Result<RawResponse, TransportError> + Send + Sync>;

#[derive(Debug, Clone)]
pub(crate) struct SentRequest {
    pub request: Request,
    pub bearer:  Option<String>,
}

/// Replays queued responses first, then falls back to `handler`, then to a
/// network failure.
#[derive(Default)]
pub(crate) struct MockTransport {
    queue:    Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    handler:  Option<Handler>,
    requests: Mutex<Vec<SentRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&Request) -> Result<RawResponse, TransportError> + Send + Sync + 'static,
    {
        Self { handler: Some(Box::new(handler)), ..Self::default() }
    }

    pub fn push(&self, response: RawResponse) {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).push_back(Ok(response));
    }

    pub fn push_json(&self, status: u16, body: serde_json::Value) {
        self.push(RawResponse::json(status, &body));
    }

    pub fn push_network_failure(&self) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Err(TransportError("connection refused".into())));
    }

    pub fn requests(&self) -> Vec<SentRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Paths of every POST whose path contains `fragment`, in order.
    pub fn posts_to(&self, fragment: &str) -> Vec<Request> {
        self.requests()
            .into_iter()
            .map(|s| s.request)
            .filter(|r| matches!(r, Request::Post { path, .. } if path.contains(fragment)))
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &Request, bearer: Option<&str>) -> Result<RawResponse, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SentRequest { request: request.clone(), bearer: bearer.map(str::to_string) });

        if let Some(next) = self.queue.lock().unwrap_or_else(PoisonError::into_inner).pop_front() {
            return next;
        }

        match &self.handler {
            Some(handler) => handler(request),
            None => Err(TransportError("no scripted response".into())),
        }
    }
}

// ─── Fake Backend ─────────────────────────────────────────────────────────────

pub(crate) const FAKE_SESSION_ID: Uuid = Uuid::from_u128(0x5d1f_3c52_6d0c_4a3e_8f7a_2b1e_0c9d_8a11);

#[derive(Debug, Default)]
struct Control {
    offline:         bool,
    decision_status: Option<u16>,
    accepted:        u32,
}

/// A [`MockTransport`] whose handler behaves like the real backend, with
/// switches to make parts of it fail.
pub(crate) struct FakeBackend {
    transport: Arc<MockTransport>,
    control:   Arc<Mutex<Control>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        let control = Arc::new(Mutex::new(Control::default()));
        let handler_control = control.clone();
        let transport = Arc::new(MockTransport::with_handler(move |request| {
            let mut control = handler_control.lock().unwrap_or_else(PoisonError::into_inner);
            route(&mut control, request)
        }));
        Self { transport, control }
    }

    pub fn transport(&self) -> Arc<MockTransport> {
        self.transport.clone()
    }

    pub fn set_offline(&self, offline: bool) {
        self.control.lock().unwrap_or_else(PoisonError::into_inner).offline = offline;
    }

    pub fn reject_decisions_with(&self, status: u16) {
        self.control.lock().unwrap_or_else(PoisonError::into_inner).decision_status = Some(status);
    }

    pub fn accept_decisions(&self) {
        self.control.lock().unwrap_or_else(PoisonError::into_inner).decision_status = None;
    }

    /// Every decision body that reached the transport, accepted or not.
    pub fn decision_posts(&self) -> Vec<DecisionRecord> {
        self.transport
            .posts_to("/decisions/")
            .into_iter()
            .filter_map(|r| match r {
                Request::Post { body, .. } => serde_json::from_value(body).ok(),
                Request::Get { .. } => None,
            })
            .collect()
    }
}

fn route(control: &mut Control, request: &Request) -> Result<RawResponse, TransportError> {
    if control.offline {
        return Err(TransportError("backend offline".into()));
    }

    let path = request.path().to_string();
    let last_segment_num = || path.rsplit('/').next().and_then(|s| s.parse::<u32>().ok()).unwrap_or(0);

    match request {
        Request::Post { body, .. } if path.contains("/decisions/") => match control.decision_status {
            Some(status) => Ok(RawResponse::json(status, &json!({"detail": "decision rejected"}))),
            None => {
                control.accepted += 1;
                let result = if body["decision"] == "skip" { 0.0 } else { 1.25 };
                Ok(RawResponse::json(201, &json!({"result_final": result})))
            }
        },
        Request::Post { body, .. } if path.starts_with("/sessions/") => Ok(RawResponse::json(
            201,
            &json!({
                "session_id": FAKE_SESSION_ID,
                "status":     "active",
                "created_at": Utc::now(),
                "user_id":    7,
                "config":     body,
            }),
        )),
        Request::Get { .. } if path.contains("/iterations/") => Ok(RawResponse::json(
            200,
            &json!({
                "iteration_num": last_segment_num(),
                "chart": {"bars": [[1.0, 1.2, 0.9, 1.1]]},
            }),
        )),
        Request::Get { .. } if path.starts_with("/session-results/") => Ok(RawResponse::json(
            200,
            &json!({
                "session_id":              FAKE_SESSION_ID,
                "mode":                    "custom",
                "total_decisions":         control.accepted,
                "profitable_decisions":    control.accepted,
                "unprofitable_decisions":  0,
                "skipped_decisions":       0,
                "total_result":            1.25 * f64::from(control.accepted),
                "median_decisions_result": 1.25,
                "best_decisions_result":   1.25,
                "worst_decisions_result":  1.25,
                "total_time_spent":        0.0,
            }),
        )),
        _ => Ok(RawResponse::new(404, "Not Found")),
    }
}

pub(crate) fn sample_config() -> SessionConfig {
    SessionConfig {
        mode:             SessionMode::Custom,
        market:           "Shares".into(),
        ticker:           "SBER".into(),
        timeframe:        "M1".into(),
        bars_number:      50,
        timer_seconds:    5,
        start_datetime:   None,
        iterations_count: 10,
        slippage:         0.001,
        fixing_bar:       20,
    }
}

/// An engine talking to `backend` as a signed-in user.
pub(crate) fn engine_with(backend: &FakeBackend) -> SessionEngine {
    let token = crate::auth::tests::make_token(Utc::now() + Duration::hours(1));
    let storage = MemoryIdentityStorage::with_identity(Identity::new("7", "trader@flash.io", token));
    let gateway = ApiGateway::new(backend.transport(), build_state(Box::new(storage)));
    SessionEngine::new(gateway)
}
