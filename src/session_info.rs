//! Introspection of the current session.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::error::{Result, decode};
use crate::session::SessionStore;
use crate::transport::Transport;
use crate::user::{USERINFO_PATH, UserProfile};

/// Who the session belongs to and until when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    /// Whether an access token is held.
    pub is_authenticated: bool,
    /// The user behind the token, fetched from `userinfo`.
    pub user: Option<UserProfile>,
    /// Local expiry of the access token.
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionInfo {
    fn anonymous() -> Self {
        SessionInfo {
            is_authenticated: false,
            user: None,
            expires_at: None,
        }
    }
}

/// Session introspection.
#[derive(Clone)]
pub struct SessionInfoModule {
    transport: Arc<Transport>,
    session: Arc<SessionStore>,
}

impl SessionInfoModule {
    /// Builds the module over a shared transport and session store.
    pub fn new(transport: Arc<Transport>, session: Arc<SessionStore>) -> Self {
        SessionInfoModule { transport, session }
    }

    /// Describes the current session.
    ///
    /// Anonymous sessions are answered locally with no network call. With a
    /// token held, the user is resolved via GET `/api/v1/userinfo`; a server
    /// rejection surfaces as an error rather than an anonymous answer.
    pub async fn current(&self) -> Result<SessionInfo> {
        let snapshot = self.session.snapshot();
        let Some(token) = snapshot.access_token() else {
            return Ok(SessionInfo::anonymous());
        };

        let resp = self.transport.get(USERINFO_PATH, Some(token)).await?;
        let user: UserProfile = decode(&resp, "userinfo")?;

        Ok(SessionInfo {
            is_authenticated: true,
            user: Some(user),
            expires_at: snapshot.expires_at(),
        })
    }

    /// True iff an access token is held.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }
}
