//! Access-token refresh and revocation.
//!
//! Refresh never rotates the refresh token: only the access token and its
//! expiry change. Concurrent refreshes are not coalesced; each one completes
//! on its own and the last install wins, including against a login or a
//! clear that lands while the refresh is in flight.

use serde::Serialize;
use std::sync::Arc;

use crate::error::{IdentityError, Result, decode};
use crate::session::{SessionStore, TokenResponse};
use crate::transport::Transport;

pub(crate) const REFRESH_PATH: &str = "/api/v1/auth/refresh";
pub(crate) const REVOKE_PATH: &str = "/api/v1/auth/token/revoke";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Token-maintenance operations on the shared session.
#[derive(Clone)]
pub struct TokenModule {
    transport: Arc<Transport>,
    session: Arc<SessionStore>,
}

impl TokenModule {
    /// Builds the module over a shared transport and session store.
    pub fn new(transport: Arc<Transport>, session: Arc<SessionStore>) -> Self {
        TokenModule { transport, session }
    }

    /// Obtains a new access token from the held refresh token.
    ///
    /// The refresh token travels in the body; no bearer header is sent.
    /// Transport and decode failures leave the session as it was. The
    /// caller decides whether to force a logout.
    pub async fn refresh(&self) -> Result<()> {
        let refresh_token = self
            .session
            .refresh_token()
            .ok_or(IdentityError::SessionExpired)?;

        let body = RefreshRequest {
            refresh_token: &refresh_token,
        };
        let resp = self.transport.post(REFRESH_PATH, Some(&body), None).await?;
        let tokens: TokenResponse = decode(&resp, "token refresh")?;

        self.session
            .set_access_token(&tokens.access_token, tokens.expires_in);
        Ok(())
    }

    /// Revokes the current access token. Idempotent and always succeeds.
    ///
    /// Without an access token this is a no-op. Otherwise the server is
    /// notified best-effort and the session is cleared regardless.
    pub async fn revoke(&self) -> Result<()> {
        let Some(token) = self.session.access_token() else {
            return Ok(());
        };
        let _ = self
            .transport
            .post::<()>(REVOKE_PATH, None, Some(token.as_str()))
            .await;
        self.session.clear();
        Ok(())
    }
}
