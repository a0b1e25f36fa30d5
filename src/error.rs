//! # error
//!
//! Centralised error types.
//!
//! * [`ApiError`] is the single channel every gateway failure is normalised
//!   into.  It is what the [`ErrorSink`](crate::error_sink::ErrorSink) stores
//!   and what the presentation layer shows.
//! * [`EngineError`] is what the session engine returns: either a local
//!   rejection (bad config, wrong phase) or a wrapped `ApiError`.
//! * [`StorageError`] covers persisting the identity to disk.

use serde::Serialize;
use thiserror::Error;

use crate::engine::Phase;

/// Message shown when the backend cannot be reached at all.
pub const NETWORK_UNAVAILABLE_MESSAGE: &str =
    "Server is unavailable. Check your connection and try again.";

// ─── ApiError ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorKind {
    /// No response received.  Transient, the user should retry.
    NetworkUnavailable,
    /// HTTP 401.  Identity has already been cleared.
    Unauthorized,
    /// HTTP 404.  Wrong path or missing resource.
    NotFound,
    /// HTTP error with a structured body, usually field errors for a form.
    ServerValidation,
    /// HTTP error whose body is not JSON (proxy pages, 5xx text).
    ServerError,
    /// A body that could not be encoded, or a 2xx whose body does not match
    /// the expected shape.
    InvalidPayload,
}

impl ApiErrorKind {
    /// Whether the engine can stay where it is and let the user retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ApiErrorKind::NetworkUnavailable | ApiErrorKind::ServerValidation | ApiErrorKind::ServerError
        )
    }
}

impl std::fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ApiErrorKind::NetworkUnavailable => "network unavailable",
            ApiErrorKind::Unauthorized       => "unauthorized",
            ApiErrorKind::NotFound           => "not found",
            ApiErrorKind::ServerValidation   => "validation error",
            ApiErrorKind::ServerError        => "server error",
            ApiErrorKind::InvalidPayload     => "invalid payload",
        };
        f.write_str(name)
    }
}

/// A user-visible API failure.  Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind:        ApiErrorKind,
    pub message:     String,
    pub http_status: Option<u16>,
    /// Structured error body for `ServerValidation`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail:      Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), http_status: None, detail: None }
    }

    pub fn network_unavailable() -> Self {
        Self::new(ApiErrorKind::NetworkUnavailable, NETWORK_UNAVAILABLE_MESSAGE)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

// ─── EngineError ──────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum EngineError {
    /// Rejected locally before any request was made.
    #[error("Invalid session config: {0}")]
    InvalidConfig(String),

    /// The operation is not allowed in the current phase.
    #[error("Operation not allowed in phase {actual:?} (expected {expected:?})")]
    InvalidPhase { expected: Phase, actual: Phase },

    /// A decision for this iteration is already waiting to be resubmitted.
    #[error("Iteration {iteration_num} already has a pending decision; use retry()")]
    DecisionPending { iteration_num: u32 },

    #[error("Nothing to retry in phase {0:?}")]
    NothingToRetry(Phase),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl EngineError {
    /// The underlying API failure, if this error came from the backend.
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            EngineError::Api(e) => Some(e),
            _ => None,
        }
    }
}

// ─── StorageError ─────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Identity storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Identity storage format error: {0}")]
    Format(#[from] serde_json::Error),
}
