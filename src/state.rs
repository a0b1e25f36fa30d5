//! # state
//!
//! The client's **process-wide state**: who is signed in and which API
//! failures the user has not dismissed yet.
//!
//! ## Lifecycle
//!
//! * **Init** — [`AppState::hydrate`] reads the persisted identity once at
//!   startup.
//! * **Teardown** — [`AppState::teardown`] clears identity and errors
//!   explicitly (logout).  A 401 from any API call clears the identity on its
//!   own through the gateway.
//!
//! Components receive a [`SharedState`] instead of reaching for globals.

use std::sync::Arc;

use tracing::info;

use crate::auth::{AuthTokenStore, IdentityStorage, MemoryIdentityStorage};
use crate::error_sink::ErrorSink;

// ─── AppState ─────────────────────────────────────────────────────────────────

pub struct AppState {
    /// Current identity + bearer token, mirrored to storage.
    pub auth: AuthTokenStore,

    /// Every API failure in the order it happened.
    pub errors: ErrorSink,
}

impl AppState {
    pub fn hydrate(storage: Box<dyn IdentityStorage>) -> Self {
        Self {
            auth:   AuthTokenStore::hydrate(storage),
            errors: ErrorSink::new(),
        }
    }

    /// Signed-out state that persists nothing.
    pub fn in_memory() -> Self {
        Self::hydrate(Box::new(MemoryIdentityStorage::new()))
    }

    pub fn teardown(&self) {
        self.auth.clear_identity();
        self.errors.clear();
        info!("App state torn down");
    }
}

/// Convenience type alias
pub type SharedState = Arc<AppState>;

pub fn build_state(storage: Box<dyn IdentityStorage>) -> SharedState {
    Arc::new(AppState::hydrate(storage))
}
