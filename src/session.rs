//! In-memory session store: access token, its expiry, and the refresh token.
//!
//! Invariants:
//! - One lock covers the whole triple. Every mutation replaces it in a single
//!   critical section, so a reader never sees fields from two different writes.
//! - The lock is never held across an await point; all operations are pure
//!   local-state transitions.
//! - Empty strings are never stored. An empty token is treated as absent.
//!
//! Authentication is presence-based: [`SessionStore::is_authenticated`] only
//! checks that an access token is held. Expiry is detected reactively when the
//! server rejects the token; [`SessionStore::is_expired`] is available for
//! callers that want to refresh proactively.

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{IdentityError, Result};

/// Lifetime given to an access token seeded without an explicit expiry.
pub const DEFAULT_SEEDED_TOKEN_LIFETIME_SECS: u64 = 3600;

/// Token payload returned by login and refresh.
///
/// `refreshToken` is only present on login; refresh responses omit it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    /// New bearer credential.
    pub access_token: String,
    /// Lifetime of `access_token` in seconds, relative to receipt.
    pub expires_in: u64,
    /// Long-lived credential used to mint new access tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// A consistent snapshot of the session triple.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    access_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    refresh_token: Option<String>,
}

impl Session {
    /// Current access token, if any.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Absolute expiry of the access token, if any.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Current refresh token, if any.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.expires_at.is_none() && self.refresh_token.is_none()
    }
}

/// Thread-safe owner of the client's [`Session`].
///
/// Shared by `Arc` between every module of one [`crate::IdentityClient`].
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: RwLock<Session>,
}

impl SessionStore {
    /// An empty (anonymous) store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with an access token and no refresh token. The token
    /// is given [`DEFAULT_SEEDED_TOKEN_LIFETIME_SECS`].
    pub fn with_access_token(token: &str) -> Self {
        let store = Self::new();
        store.set_access_token(token, DEFAULT_SEEDED_TOKEN_LIFETIME_SECS);
        store
    }

    /// Reads the whole triple atomically.
    pub fn snapshot(&self) -> Session {
        self.inner.read().clone()
    }

    /// Current access token. Does not check expiry.
    pub fn access_token(&self) -> Option<String> {
        self.inner.read().access_token.clone()
    }

    /// Current refresh token.
    pub fn refresh_token(&self) -> Option<String> {
        self.inner.read().refresh_token.clone()
    }

    /// Absolute expiry of the current access token.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().expires_at
    }

    /// Installs a full login response: access token, `now + expires_in`,
    /// and refresh token, replacing whatever was held.
    pub fn set_tokens(&self, tokens: &TokenResponse) {
        let next = Session {
            access_token: non_empty(&tokens.access_token),
            expires_at: Some(expiry_from_now(tokens.expires_in)),
            refresh_token: tokens.refresh_token.as_deref().and_then(non_empty),
        };
        *self.inner.write() = normalized(next);
    }

    /// Installs a new access token and expiry, leaving the refresh token
    /// untouched.
    pub fn set_access_token(&self, token: &str, expires_in: u64) {
        let mut session = self.inner.write();
        session.access_token = non_empty(token);
        session.expires_at = session
            .access_token
            .as_ref()
            .map(|_| expiry_from_now(expires_in));
    }

    /// Zeroes all three fields.
    pub fn clear(&self) {
        *self.inner.write() = Session::default();
    }

    /// True iff an access token is held. Expiry is not consulted.
    pub fn is_authenticated(&self) -> bool {
        self.inner.read().access_token.is_some()
    }

    /// True when an access token is held and `now >= expires_at`.
    pub fn is_expired(&self) -> bool {
        let session = self.inner.read();
        match (&session.access_token, session.expires_at) {
            (Some(_), Some(at)) => Utc::now() >= at,
            _ => false,
        }
    }

    /// The access token, or `SessionExpired` when none is held.
    pub(crate) fn require_access_token(&self) -> Result<String> {
        self.access_token().ok_or(IdentityError::SessionExpired)
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Drops the expiry when no access token came with it.
fn normalized(mut session: Session) -> Session {
    if session.access_token.is_none() {
        session.expires_at = None;
    }
    session
}

/// `now + expires_in`, saturating at the maximum representable instant.
fn expiry_from_now(expires_in: u64) -> DateTime<Utc> {
    let now = Utc::now();
    i64::try_from(expires_in)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
