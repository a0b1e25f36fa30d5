//! # api::endpoints — Typed wrappers for every backend route
//!
//! | Method | Path                                               | Returns          |
//! |--------|----------------------------------------------------|------------------|
//! | POST   | `/sign-up`                                         | `Identity`       |
//! | POST   | `/login`                                           | `Identity`       |
//! | GET    | `/session-options/{mode}`                          | `SessionOptions` |
//! | POST   | `/sessions/{mode}`                                 | `SessionHandle`  |
//! | GET    | `/sessions/{mode}/{session_id}/iterations/{n}`     | `IterationChart` |
//! | POST   | `/sessions/{mode}/{session_id}/decisions/{n}`      | `DecisionAck`    |
//! | GET    | `/session-results/{mode}/{session_id}`             | `SessionResults` |
//! | GET    | `/scoreboards/{mode}/{user_id}`                    | `Scoreboard`     |

use tracing::info;
use uuid::Uuid;

use super::ApiGateway;
use crate::error::ApiError;
use crate::models::{
    Credentials, DecisionAck, DecisionRecord, Identity, IterationChart, Scoreboard, SessionConfig,
    SessionHandle, SessionMode, SessionOptions, SessionResults, SignUp,
};

pub mod paths {
    use uuid::Uuid;

    use crate::models::SessionMode;

    pub const SIGN_UP: &str = "/sign-up";
    pub const LOGIN: &str = "/login";

    pub fn session_options(mode: SessionMode) -> String {
        format!("/session-options/{mode}")
    }

    pub fn sessions(mode: SessionMode) -> String {
        format!("/sessions/{mode}")
    }

    pub fn iteration(mode: SessionMode, session_id: Uuid, iteration_num: u32) -> String {
        format!("/sessions/{mode}/{session_id}/iterations/{iteration_num}")
    }

    pub fn decision(mode: SessionMode, session_id: Uuid, iteration_num: u32) -> String {
        format!("/sessions/{mode}/{session_id}/decisions/{iteration_num}")
    }

    pub fn session_results(mode: SessionMode, session_id: Uuid) -> String {
        format!("/session-results/{mode}/{session_id}")
    }

    pub fn scoreboard(mode: SessionMode, user_id: &str) -> String {
        format!("/scoreboards/{mode}/{user_id}")
    }
}

impl ApiGateway {
    // ── Identity ──────────────────────────────────────────────────────────────

    pub async fn sign_up(&self, form: &SignUp) -> Result<Identity, ApiError> {
        let identity: Identity = self.post(paths::SIGN_UP, form).await?;
        self.state().auth.set_identity(identity.clone());
        Ok(identity)
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Identity, ApiError> {
        let identity: Identity = self.post(paths::LOGIN, credentials).await?;
        self.state().auth.set_identity(identity.clone());
        Ok(identity)
    }

    /// Purely local: the backend keeps no server-side session to end.
    pub fn logout(&self) {
        self.state().auth.clear_identity();
        info!("👋 Logged out");
    }

    // ── Sessions ──────────────────────────────────────────────────────────────

    pub async fn session_options(&self, mode: SessionMode) -> Result<SessionOptions, ApiError> {
        self.get(paths::session_options(mode)).await
    }

    pub async fn create_session(&self, config: &SessionConfig) -> Result<SessionHandle, ApiError> {
        self.post(paths::sessions(config.mode), config).await
    }

    pub async fn fetch_iteration(
        &self,
        mode: SessionMode,
        session_id: Uuid,
        iteration_num: u32,
    ) -> Result<IterationChart, ApiError> {
        self.get(paths::iteration(mode, session_id, iteration_num)).await
    }

    pub async fn record_decision(&self, mode: SessionMode, record: &DecisionRecord) -> Result<DecisionAck, ApiError> {
        let ack: Option<DecisionAck> = self
            .post(paths::decision(mode, record.session_id, record.iteration_num), record)
            .await?;
        Ok(ack.unwrap_or_default())
    }

    pub async fn session_results(&self, mode: SessionMode, session_id: Uuid) -> Result<SessionResults, ApiError> {
        self.get(paths::session_results(mode, session_id)).await
    }

    pub async fn scoreboard(&self, mode: SessionMode, user_id: &str) -> Result<Scoreboard, ApiError> {
        self.get(paths::scoreboard(mode, user_id)).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::api::Request;
    use crate::error::ApiErrorKind;
    use crate::state::{AppState, SharedState};
    use crate::testing::MockTransport;

    fn gateway() -> (ApiGateway, Arc<MockTransport>, SharedState) {
        let state = Arc::new(AppState::in_memory());
        let transport = Arc::new(MockTransport::new());
        (ApiGateway::new(transport.clone(), state.clone()), transport, state)
    }

    #[test]
    fn test_paths() {
        let id = Uuid::nil();
        assert_eq!(paths::iteration(SessionMode::Classic, id, 3), format!("/sessions/classic/{id}/iterations/3"));
        assert_eq!(paths::decision(SessionMode::Blitz, id, 1), format!("/sessions/blitz/{id}/decisions/1"));
        assert_eq!(paths::scoreboard(SessionMode::Crypto, "7"), "/scoreboards/crypto/7");
    }

    #[tokio::test]
    async fn test_login_sets_identity() {
        let (gateway, transport, state) = gateway();
        transport.push_json(200, json!({"id": "7", "email": "u@x.io", "access_token": "tok"}));

        let identity = gateway
            .login(&Credentials { email: "u@x.io".into(), password: "pw".into() })
            .await
            .unwrap();

        assert_eq!(identity.token.as_deref(), Some("tok"));
        assert_eq!(state.auth.current_identity(), identity);
        match &transport.requests()[0].request {
            Request::Post { path, body } => {
                assert_eq!(path, paths::LOGIN);
                assert_eq!(body["email"], "u@x.io");
            }
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_sign_up_with_numeric_user_id() {
        let (gateway, transport, state) = gateway();
        transport.push_json(201, json!({"id": 7, "email": "u@x.io", "token": "tok"}));

        let form = SignUp { email: "u@x.io".into(), name: "U".into(), password: "pw".into() };
        let identity = gateway.sign_up(&form).await.unwrap();

        assert_eq!(identity.id.as_deref(), Some("7"));
        assert_eq!(state.auth.current_identity(), identity);
        assert!(state.errors.is_empty());
    }

    #[tokio::test]
    async fn test_failed_login_keeps_previous_identity() {
        let (gateway, transport, state) = gateway();
        state.auth.set_identity(Identity::new("1", "old@x.io", "old"));
        transport.push_json(400, json!({"detail": "Wrong password"}));

        let err = gateway
            .login(&Credentials { email: "u@x.io".into(), password: "bad".into() })
            .await
            .unwrap_err();

        assert_eq!(err.kind, ApiErrorKind::ServerValidation);
        assert_eq!(state.auth.current_identity().email.as_deref(), Some("old@x.io"));
    }

    #[tokio::test]
    async fn test_logout_clears_identity() {
        let (gateway, _transport, state) = gateway();
        state.auth.set_identity(Identity::new("1", "u@x.io", "t"));
        gateway.logout();
        assert!(state.auth.current_identity().is_empty());
    }

    #[tokio::test]
    async fn test_record_decision_accepts_empty_ack() {
        let (gateway, transport, _state) = gateway();
        transport.push(crate::api::RawResponse::new(201, ""));

        let record = DecisionRecord {
            session_id:         Uuid::nil(),
            iteration_num:      1,
            decision:           crate::models::Decision::Buy,
            time_spent_seconds: 2,
        };
        let ack = gateway.record_decision(SessionMode::Custom, &record).await.unwrap();
        assert_eq!(ack, DecisionAck::default());
    }
}
