//! `IdentityClient`: the entry point that wires every module together.
//!
//! One client owns one [`Transport`] and one [`SessionStore`], both shared by
//! `Arc` with each module. There is no global session: two clients are two
//! independent sessions, and the session lives exactly as long as the last
//! module handle cloned out of its client.

use std::sync::Arc;

use crate::auth::AuthModule;
use crate::config::ClientConfig;
use crate::device::DeviceModule;
use crate::eid::EidModule;
use crate::error::Result;
use crate::machine::MachineModule;
use crate::session::SessionStore;
use crate::session_info::SessionInfoModule;
use crate::token::TokenModule;
use crate::transport::Transport;
use crate::user::UserModule;

/// Client for the identity service.
#[derive(Clone)]
pub struct IdentityClient {
    auth: AuthModule,
    token: TokenModule,
    session_info: SessionInfoModule,
    user: UserModule,
    device: DeviceModule,
    eid: EidModule,
    machine: MachineModule,
    session: Arc<SessionStore>,
}

impl IdentityClient {
    /// Validates `config` and builds the client.
    ///
    /// If `config` carries an access token, the session starts authenticated
    /// with it (no refresh token).
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let transport = Arc::new(Transport::new(&config)?);
        let session = Arc::new(match config.access_token.as_deref() {
            Some(token) => SessionStore::with_access_token(token),
            None => SessionStore::new(),
        });

        Ok(IdentityClient {
            auth: AuthModule::new(Arc::clone(&transport), Arc::clone(&session)),
            token: TokenModule::new(Arc::clone(&transport), Arc::clone(&session)),
            session_info: SessionInfoModule::new(Arc::clone(&transport), Arc::clone(&session)),
            user: UserModule::new(Arc::clone(&transport), Arc::clone(&session)),
            device: DeviceModule::new(Arc::clone(&transport), Arc::clone(&session)),
            eid: EidModule::new(Arc::clone(&transport), Arc::clone(&session)),
            machine: MachineModule::new(transport, config.client_id),
            session,
        })
    }

    /// Login, logout, step-up.
    pub fn auth(&self) -> &AuthModule {
        &self.auth
    }

    /// Refresh and revoke.
    pub fn token(&self) -> &TokenModule {
        &self.token
    }

    /// Session introspection.
    pub fn session(&self) -> &SessionInfoModule {
        &self.session_info
    }

    /// User profile and roles.
    pub fn user(&self) -> &UserModule {
        &self.user
    }

    /// Device queries.
    pub fn device(&self) -> &DeviceModule {
        &self.device
    }

    /// EID verification.
    pub fn eid(&self) -> &EidModule {
        &self.eid
    }

    /// Machine enrollment and client-credentials exchange.
    pub fn machine(&self) -> &MachineModule {
        &self.machine
    }

    /// The shared session store.
    pub fn session_store(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// True iff an access token is held.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }
}
