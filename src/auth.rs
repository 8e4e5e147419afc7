//! Login, logout and step-up for a human principal.
//!
//! Together with [`crate::token`] this module owns every transition of the
//! session:
//!
//! | Operation | From | To | Network |
//! |-----------|------|----|---------|
//! | [`AuthModule::login`] | any | Authenticated | POST `/api/v1/auth/login`, no bearer |
//! | [`AuthModule::strengthen`] | Authenticated | Authenticated | POST `/api/v1/auth/strengthen`, bearer |
//! | [`AuthModule::logout`] | any | Anonymous | POST `/api/v1/auth/logout`, bearer, best-effort |
//!
//! Logout is local-first: the server notification may fail and the session
//! is still cleared, so offline logout works.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, decode};
use crate::session::{SessionStore, TokenResponse};
use crate::transport::Transport;

pub(crate) const LOGIN_PATH: &str = "/api/v1/auth/login";
pub(crate) const LOGOUT_PATH: &str = "/api/v1/auth/logout";
pub(crate) const STRENGTHEN_PATH: &str = "/api/v1/auth/strengthen";

/// Email/password credential with an optional TOTP code. Never stored.
#[derive(Clone)]
pub struct AuthInput {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Current TOTP code, for accounts with 2FA enabled.
    pub totp_code: Option<String>,
}

impl AuthInput {
    /// Credential without a TOTP code.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        AuthInput {
            email: email.into(),
            password: password.into(),
            totp_code: None,
        }
    }

    /// Attaches a TOTP code.
    #[must_use]
    pub fn with_totp(mut self, code: impl Into<String>) -> Self {
        self.totp_code = Some(code.into());
        self
    }
}

impl fmt::Debug for AuthInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthInput")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("totp_code", &self.totp_code.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Second factor used to step up an existing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepUpFactor {
    /// Authenticator app code.
    Totp,
    /// Code delivered by email.
    Email,
    /// Code delivered by SMS.
    Sms,
}

/// A step-up assertion: the factor plus its value, when the factor needs one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrengthenInput {
    /// Which factor is being asserted.
    pub factor: StepUpFactor,
    /// The code or other proof, if any.
    pub value: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    totp_code: Option<&'a str>,
}

impl<'a> From<&'a AuthInput> for LoginRequest<'a> {
    fn from(input: &'a AuthInput) -> Self {
        LoginRequest {
            email: &input.email,
            password: &input.password,
            totp_code: input.totp_code.as_deref().filter(|code| !code.is_empty()),
        }
    }
}

#[derive(Serialize)]
struct StrengthenRequest<'a> {
    #[serde(rename = "type")]
    factor: StepUpFactor,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a str>,
}

/// Session-establishing operations.
#[derive(Clone)]
pub struct AuthModule {
    transport: Arc<Transport>,
    session: Arc<SessionStore>,
}

impl AuthModule {
    /// Builds the module over a shared transport and session store.
    pub fn new(transport: Arc<Transport>, session: Arc<SessionStore>) -> Self {
        AuthModule { transport, session }
    }

    /// Exchanges a credential for a token pair and installs it.
    ///
    /// The request carries no bearer token. On a transport failure the
    /// session is untouched; on a malformed body the error is
    /// [`crate::IdentityError::Protocol`] and the session is untouched too.
    pub async fn login(&self, input: &AuthInput) -> Result<()> {
        let body = LoginRequest::from(input);
        let resp = self.transport.post(LOGIN_PATH, Some(&body), None).await?;
        let tokens: TokenResponse = decode(&resp, "login")?;
        self.session.set_tokens(&tokens);
        Ok(())
    }

    /// Asserts an additional factor on the current session.
    ///
    /// Requires an access token; fails with
    /// [`crate::IdentityError::SessionExpired`] before any network call
    /// otherwise. The session is not modified either way.
    pub async fn strengthen(&self, input: &StrengthenInput) -> Result<()> {
        let token = self.session.require_access_token()?;
        let body = StrengthenRequest {
            factor: input.factor,
            value: input.value.as_deref().filter(|v| !v.is_empty()),
        };
        self.transport
            .post(STRENGTHEN_PATH, Some(&body), Some(token.as_str()))
            .await?;
        Ok(())
    }

    /// Ends the session. Always succeeds.
    ///
    /// If an access token is held the server is notified, and any failure
    /// of that call is ignored. The session is cleared last, unconditionally.
    pub async fn logout(&self) -> Result<()> {
        if let Some(token) = self.session.access_token() {
            let _ = self
                .transport
                .post::<()>(LOGOUT_PATH, None, Some(token.as_str()))
                .await;
        }
        self.session.clear();
        Ok(())
    }
}
