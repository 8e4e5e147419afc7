//! Profile and role lookups for the authenticated user.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{Result, decode};
use crate::session::SessionStore;
use crate::transport::Transport;

pub(crate) const PROFILE_PATH: &str = "/api/v1/users/me";
pub(crate) const USERINFO_PATH: &str = "/api/v1/userinfo";

/// A user's profile as returned by `users/me` and `userinfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// User identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Primary email.
    #[serde(default)]
    pub email: String,
    /// Role name.
    #[serde(default)]
    pub role: String,
    /// Whether the account is enabled.
    #[serde(default)]
    pub is_active: bool,
    /// Account kind (e.g. `"personal"`, `"organization"`).
    #[serde(default)]
    pub account_type: String,
    /// Unix timestamp of creation.
    #[serde(default)]
    pub created_at: i64,
    /// Unix timestamp of the last update.
    #[serde(default)]
    pub updated_at: i64,
}

/// A role held by the user and the permissions it grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRole {
    /// Identifier of the role holder.
    pub id: String,
    /// Role name.
    pub name: String,
    /// Granted permissions.
    pub permissions: Vec<String>,
}

/// User queries.
#[derive(Clone)]
pub struct UserModule {
    transport: Arc<Transport>,
    session: Arc<SessionStore>,
}

impl UserModule {
    /// Builds the module over a shared transport and session store.
    pub fn new(transport: Arc<Transport>, session: Arc<SessionStore>) -> Self {
        UserModule { transport, session }
    }

    /// Fetches the full profile.
    pub async fn profile(&self) -> Result<UserProfile> {
        let token = self.session.require_access_token()?;
        let resp = self.transport.get(PROFILE_PATH, Some(token.as_str())).await?;
        decode(&resp, "user profile")
    }

    /// Returns the user's roles.
    ///
    /// `userinfo` exposes a single role name and no permission list, so the
    /// result is one role with an empty permission set.
    pub async fn roles(&self) -> Result<Vec<UserRole>> {
        let token = self.session.require_access_token()?;
        let resp = self.transport.get(USERINFO_PATH, Some(token.as_str())).await?;
        let user: UserProfile = decode(&resp, "userinfo")?;
        Ok(vec![UserRole {
            id: user.id,
            name: user.role,
            permissions: Vec::new(),
        }])
    }

    /// Whether any of the user's roles grants `permission`.
    pub async fn has_permission(&self, permission: &str) -> Result<bool> {
        let roles = self.roles().await?;
        Ok(roles
            .iter()
            .any(|role| role.permissions.iter().any(|p| p == permission)))
    }
}
