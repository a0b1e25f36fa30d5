//! # auth — Identity & Bearer Token Store
//!
//! Holds the signed-in [`Identity`] in memory and mirrors it to an
//! [`IdentityStorage`] so it survives restarts.
//!
//! ## Validity
//! The token is JWT-shaped (`header.payload.signature`).  The payload is
//! base64url JSON carrying `exp` in seconds since the epoch.  A token counts
//! only while `exp` is strictly in the future; anything unparseable counts as
//! invalid.
//!
//! ## Persistence
//! Stored as three discrete fields (`id`, `email`, `token`).  A failed write
//! is logged and ignored: the in-memory identity is the source of truth for
//! the running process.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::StorageError;
use crate::models::Identity;

// ─── Storage Seam ─────────────────────────────────────────────────────────────

/// Where the identity lives between runs.
pub trait IdentityStorage: Send + Sync {
    fn load(&self) -> Result<Identity, StorageError>;
    fn save(&self, identity: &Identity) -> Result<(), StorageError>;
    fn erase(&self) -> Result<(), StorageError>;
}

/// JSON file with `id`, `email` and `token` keys.
#[derive(Debug, Clone)]
pub struct FileIdentityStorage {
    path: PathBuf,
}

impl FileIdentityStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IdentityStorage for FileIdentityStorage {
    fn load(&self) -> Result<Identity, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Identity::empty()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, identity: &Identity) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // sibling tmp file, renamed into place
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(identity)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn erase(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Non-persistent storage for tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryIdentityStorage {
    saved: Mutex<Identity>,
}

impl MemoryIdentityStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(identity: Identity) -> Self {
        Self { saved: Mutex::new(identity) }
    }
}

impl IdentityStorage for MemoryIdentityStorage {
    fn load(&self) -> Result<Identity, StorageError> {
        Ok(self.saved.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, identity: &Identity) -> Result<(), StorageError> {
        *self.saved.lock().unwrap_or_else(PoisonError::into_inner) = identity.clone();
        Ok(())
    }

    fn erase(&self) -> Result<(), StorageError> {
        *self.saved.lock().unwrap_or_else(PoisonError::into_inner) = Identity::empty();
        Ok(())
    }
}

// ─── Token Store ──────────────────────────────────────────────────────────────

pub struct AuthTokenStore {
    current: RwLock<Identity>,
    storage: Box<dyn IdentityStorage>,
}

impl AuthTokenStore {
    /// Read whatever identity was persisted last time.  A broken file is
    /// treated as "signed out" rather than an error.
    pub fn hydrate(storage: Box<dyn IdentityStorage>) -> Self {
        let current = match storage.load() {
            Ok(identity) => identity,
            Err(e) => {
                warn!(error = %e, "Could not read persisted identity — starting signed out");
                Identity::empty()
            }
        };

        debug!(has_token = current.token.is_some(), "Identity hydrated");

        Self { current: RwLock::new(current), storage }
    }

    pub fn set_identity(&self, identity: Identity) {
        if let Err(e) = self.storage.save(&identity) {
            warn!(error = %e, "Failed to persist identity");
        }
        info!(email = identity.email.as_deref().unwrap_or("-"), "🔑 Identity set");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = identity;
    }

    /// Idempotent.
    pub fn clear_identity(&self) {
        if let Err(e) = self.storage.erase() {
            warn!(error = %e, "Failed to erase persisted identity");
        }
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if !guard.is_empty() {
            info!("🔒 Identity cleared");
        }
        *guard = Identity::empty();
    }

    pub fn current_identity(&self) -> Identity {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn token(&self) -> Option<String> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(Utc::now())
    }

    pub fn is_authenticated_at(&self, now: DateTime<Utc>) -> bool {
        self.token()
            .and_then(|t| token_expiry(&t))
            .map(|exp| exp > now)
            .unwrap_or(false)
    }
}

#[derive(Deserialize)]
struct TokenClaims {
    exp: i64,
}

/// Expiry embedded in a JWT-shaped token, or `None` if it cannot be read.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut parts = token.split('.');
    let (_header, payload, _sig) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: TokenClaims = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claims.exp, 0)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
