//! # api — Authenticated Gateway to the Backend
//!
//! Every backend call goes through [`ApiGateway::request`], which
//!
//! 1. attaches `Authorization: Bearer <token>` when a token exists,
//! 2. sends through a [`Transport`] (reqwest in production),
//! 3. turns every failure into one [`ApiError`], appends it to the
//!    [`ErrorSink`](crate::error_sink::ErrorSink) and returns it.
//!
//! ## Failure mapping
//! ```text
//! no response        → NetworkUnavailable (fixed message, never retried here)
//! 401                → Unauthorized       (identity cleared first)
//! 404                → NotFound           (names the path)
//! other + JSON body  → ServerValidation   (payload kept in `detail`)
//! other + text body  → ServerError
//! 2xx + bad body     → InvalidPayload
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiErrorKind};
use crate::state::SharedState;

pub mod endpoints;
pub mod transport;

pub use transport::ReqwestTransport;

// ─── Request / Response ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Get  { path: String },
    Post { path: String, body: serde_json::Value },
}

impl Request {
    pub fn get(path: impl Into<String>) -> Self {
        Request::Get { path: path.into() }
    }

    /// Encode `body` as JSON.  Fails only for types serde cannot represent.
    pub fn post<B: Serialize + ?Sized>(path: impl Into<String>, body: &B) -> Result<Self, serde_json::Error> {
        Ok(Request::Post { path: path.into(), body: serde_json::to_value(body)? })
    }

    pub fn method(&self) -> &'static str {
        match self {
            Request::Get { .. }  => "GET",
            Request::Post { .. } => "POST",
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Request::Get { path } | Request::Post { path, .. } => path,
        }
    }
}

/// What came back over the wire, before interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body:   String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self::new(status, body.to_string())
    }
}

/// No response was received (connect error, timeout, broken body stream).
#[derive(Debug, Clone, Error)]
#[error("transport failure: {0}")]
pub struct TransportError(pub String);

/// The HTTP library seam.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &Request, bearer: Option<&str>) -> Result<RawResponse, TransportError>;
}

// ─── Gateway ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct ApiGateway {
    transport: Arc<dyn Transport>,
    state:     SharedState,
}

impl ApiGateway {
    pub fn new(transport: Arc<dyn Transport>, state: SharedState) -> Self {
        Self { transport, state }
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Send `request` and decode the 2xx body as `R`.
    ///
    /// Every `Err` has already been appended to the error sink.
    pub async fn request<R: DeserializeOwned>(&self, request: Request) -> Result<R, ApiError> {
        let token = self.state.auth.token();

        debug!(method = request.method(), path = request.path(), auth = token.is_some(), "→ API request");

        let raw = match self.transport.send(&request, token.as_deref()).await {
            Ok(raw) => raw,
            Err(e) => {
                debug!(error = %e, path = request.path(), "No response from backend");
                return Err(self.record(ApiError::network_unavailable()));
            }
        };

        debug!(status = raw.status, path = request.path(), "← API response");

        match raw.status {
            200..=299 => decode_body(&raw.body).map_err(|e| {
                self.record(
                    ApiError::new(ApiErrorKind::InvalidPayload, format!("Unexpected response from {}: {e}", request.path()))
                        .with_status(raw.status),
                )
            }),
            401 => {
                // identity is gone before the error reaches the sink
                self.state.auth.clear_identity();
                Err(self.record(
                    ApiError::new(ApiErrorKind::Unauthorized, "Your session has expired. Please sign in again.")
                        .with_status(401),
                ))
            }
            404 => Err(self.record(
                ApiError::new(ApiErrorKind::NotFound, format!("Resource not found: {}", request.path()))
                    .with_status(404),
            )),
            status => Err(self.record(classify_error_body(status, &raw.body))),
        }
    }

    /// Encode `body` and POST it, recording an encoding failure like any other.
    pub async fn post<B, R>(&self, path: impl Into<String>, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let path = path.into();
        match Request::post(path.clone(), body) {
            Ok(request) => self.request(request).await,
            Err(e) => Err(self.record(ApiError::new(
                ApiErrorKind::InvalidPayload,
                format!("Could not encode request for {path}: {e}"),
            ))),
        }
    }

    pub async fn get<R: DeserializeOwned>(&self, path: impl Into<String>) -> Result<R, ApiError> {
        self.request(Request::get(path)).await
    }

    fn record(&self, error: ApiError) -> ApiError {
        warn!(kind = ?error.kind, status = ?error.http_status, message = %error.message, "API request failed");
        self.state.errors.push(error.clone());
        error
    }
}

/// An empty 2xx body decodes as JSON `null`, so `Option<T>` targets accept it.
fn decode_body<R: DeserializeOwned>(body: &str) -> Result<R, serde_json::Error> {
    if body.trim().is_empty() {
        serde_json::from_str("null")
    } else {
        serde_json::from_str(body)
    }
}

fn classify_error_body(status: u16, body: &str) -> ApiError {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(payload) if payload.is_object() || payload.is_array() => {
            let message = payload
                .get("detail")
                .and_then(|d| d.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| "The server rejected the request.".to_string());

            ApiError::new(ApiErrorKind::ServerValidation, message)
                .with_status(status)
                .with_detail(payload)
        }
        _ => ApiError::new(ApiErrorKind::ServerError, format!("Server error (HTTP {status})")).with_status(status),
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
