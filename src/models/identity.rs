//! # models::identity
//!
//! [`Identity`] is the signed-in user as the client knows it: an id, an email
//! and the bearer token the backend issued.  All three are optional because an
//! empty identity is the normal "signed out" value.

use serde::{Deserialize, Serialize};

/// The current user and their bearer credential.
///
/// A missing `token` means unauthenticated, whatever `id` and `email` say.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Sent as a number by the backend; kept as text here.
    #[serde(default, deserialize_with = "super::id::opt_string_or_number")]
    pub id: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    /// Opaque JWT-shaped token.  Newer backends call it `access_token`.
    #[serde(default, alias = "access_token")]
    pub token: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>, email: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            id:    Some(id.into()),
            email: Some(email.into()),
            token: Some(token.into()),
        }
    }

    /// An identity with nothing in it.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.email.is_none() && self.token.is_none()
    }
}

/// Body of `POST /login`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email:    String,
    pub password: String,
}

/// Body of `POST /sign-up`.
#[derive(Debug, Clone, Serialize)]
pub struct SignUp {
    pub email:    String,
    pub name:     String,
    pub password: String,
}
