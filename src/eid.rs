//! Electronic identity (EID) document verification.
//!
//! | Method | API Path |
//! |--------|----------|
//! | [`EidModule::verify`] | POST `/api/v1/eid/verify` |
//! | [`EidModule::status`] | GET `/api/v1/eid/status` |
//! | [`EidModule::revoke`] | POST `/api/v1/eid/revoke` |
//!
//! All three require an access token.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{Result, decode};
use crate::session::SessionStore;
use crate::transport::Transport;

pub(crate) const EID_VERIFY_PATH: &str = "/api/v1/eid/verify";
pub(crate) const EID_STATUS_PATH: &str = "/api/v1/eid/status";
pub(crate) const EID_REVOKE_PATH: &str = "/api/v1/eid/revoke";

/// Identity document submitted for verification. Dates are ISO 8601 strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EidVerifyInput {
    /// Document kind (e.g. `"passport"`, `"id_card"`).
    pub document_type: String,
    /// Number printed on the document.
    pub document_number: String,
    /// Date of issue.
    pub issuance_date: String,
    /// Date of expiry.
    pub expiration_date: String,
}

/// Verification state of the user's EID.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EidStatus {
    /// Whether a document has been verified.
    pub verified: bool,

    /// Kind of the verified document.
    #[serde(default)]
    pub document_type: Option<String>,

    /// Unix timestamp of verification.
    #[serde(default)]
    pub verified_at: Option<i64>,

    /// Unix timestamp after which the verification lapses.
    #[serde(default)]
    pub expires_at: Option<i64>,
}

/// EID operations.
#[derive(Clone)]
pub struct EidModule {
    transport: Arc<Transport>,
    session: Arc<SessionStore>,
}

impl EidModule {
    /// Builds the module over a shared transport and session store.
    pub fn new(transport: Arc<Transport>, session: Arc<SessionStore>) -> Self {
        EidModule { transport, session }
    }

    /// Submits a document for verification. The response body is not
    /// inspected.
    pub async fn verify(&self, input: &EidVerifyInput) -> Result<()> {
        let token = self.session.require_access_token()?;
        self.transport
            .post(EID_VERIFY_PATH, Some(input), Some(token.as_str()))
            .await?;
        Ok(())
    }

    /// Returns the current verification state.
    pub async fn status(&self) -> Result<EidStatus> {
        let token = self.session.require_access_token()?;
        let resp = self.transport.get(EID_STATUS_PATH, Some(token.as_str())).await?;
        decode(&resp, "EID status")
    }

    /// Withdraws the current verification.
    pub async fn revoke(&self) -> Result<()> {
        let token = self.session.require_access_token()?;
        self.transport
            .post::<()>(EID_REVOKE_PATH, None, Some(token.as_str()))
            .await?;
        Ok(())
    }
}
