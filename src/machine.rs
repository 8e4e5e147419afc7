//! Machine (non-human) principals: enrollment and client-credentials exchange.
//!
//! | Method | API Path |
//! |--------|----------|
//! | [`MachineModule::enroll`] | POST `/api/v1/machine/enroll` |
//! | [`MachineModule::token`] | POST `/oauth2/token` |
//! | [`MachineModule::revoke`] | POST `/oauth2/revoke` |
//!
//! This family never reads or writes the session store. Every call is
//! anonymous at the HTTP level and keyed by the configured client id plus a
//! caller-supplied secret; the returned tokens belong to the caller.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, decode};
use crate::transport::Transport;

pub(crate) const ENROLL_PATH: &str = "/api/v1/machine/enroll";
pub(crate) const OAUTH_TOKEN_PATH: &str = "/oauth2/token";
pub(crate) const OAUTH_REVOKE_PATH: &str = "/oauth2/revoke";

/// Credentials issued to a newly enrolled machine.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineEnrollment {
    /// Service-assigned machine identifier.
    pub machine_id: String,
    /// Client id the machine authenticates as.
    pub client_id: String,
    /// Secret for [`MachineModule::token`]. Shown once; store it securely.
    pub secret: String,
    /// An initial access token, when the service issues one at enrollment.
    #[serde(default)]
    pub access_token: Option<String>,
}

impl fmt::Debug for MachineEnrollment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineEnrollment")
            .field("machine_id", &self.machine_id)
            .field("client_id", &self.client_id)
            .field("secret", &"<redacted>")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Access token minted by the client-credentials grant.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineToken {
    /// Bearer credential.
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
    /// Token scheme, normally `"Bearer"`.
    #[serde(default)]
    pub token_type: String,
}

impl fmt::Debug for MachineToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineToken")
            .field("access_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .finish()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnrollRequest<'a> {
    client_id: &'a str,
}

#[derive(Serialize)]
struct ClientCredentialsRequest<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Serialize)]
struct RevokeCredentialsRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
}

/// Machine enrollment and token exchange.
#[derive(Clone)]
pub struct MachineModule {
    transport: Arc<Transport>,
    client_id: String,
}

impl MachineModule {
    /// Builds the module for `client_id`.
    pub fn new(transport: Arc<Transport>, client_id: impl Into<String>) -> Self {
        MachineModule {
            transport,
            client_id: client_id.into(),
        }
    }

    /// Enrolls this machine under the configured client id.
    pub async fn enroll(&self) -> Result<MachineEnrollment> {
        let body = EnrollRequest {
            client_id: &self.client_id,
        };
        let resp = self.transport.post(ENROLL_PATH, Some(&body), None).await?;
        decode(&resp, "machine enrollment")
    }

    /// Exchanges `secret` for an access token (client-credentials grant).
    pub async fn token(&self, secret: &str) -> Result<MachineToken> {
        let body = ClientCredentialsRequest {
            grant_type: "client_credentials",
            client_id: &self.client_id,
            client_secret: secret,
        };
        let resp = self
            .transport
            .post(OAUTH_TOKEN_PATH, Some(&body), None)
            .await?;
        decode(&resp, "machine token")
    }

    /// Revokes the machine credentials identified by `secret`.
    pub async fn revoke(&self, secret: &str) -> Result<()> {
        let body = RevokeCredentialsRequest {
            client_id: &self.client_id,
            client_secret: secret,
        };
        self.transport
            .post(OAUTH_REVOKE_PATH, Some(&body), None)
            .await?;
        Ok(())
    }
}
