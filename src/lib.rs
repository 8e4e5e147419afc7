//! Async Rust client SDK for the Aether Identity service.
//!
//! Authenticates a principal (a human user or a machine client), keeps the
//! resulting session (access token, expiry, refresh token), and exposes typed
//! operations that all go through one authenticated HTTP transport.
//!
//! # Modules
//!
//! - [`session`] — Thread-safe session store and the token wire shape.
//! - [`auth`] — Login, logout, step-up.
//! - [`token`] — Access-token refresh and revocation.
//! - [`session_info`] — Session introspection.
//! - [`user`] — Profile and roles.
//! - [`device`] — Device list and status.
//! - [`eid`] — Electronic identity verification.
//! - [`machine`] — Machine enrollment and client-credentials exchange.
//! - [`transport`] — HTTP transport with error classification and retry.
//! - [`config`] — Client configuration.
//! - [`error`] — Error types (`IdentityError`, `TransportError`).
//!
//! # Session policy
//!
//! Resource calls check only that an access token is *present*. An expired
//! token is sent as-is; when the server rejects it the error satisfies
//! [`IdentityError::is_auth_failure`] and the caller is expected to call
//! [`token::TokenModule::refresh`] (or log in again) and retry.
//!
//! # Quick Start
//!
//! ```ignore
//! use aether_identity::{AuthInput, ClientConfig, IdentityClient};
//!
//! let client = IdentityClient::new(ClientConfig::new("https://identity.example.com", "my-app"))?;
//! client.auth().login(&AuthInput::new("user@example.com", "password")).await?;
//!
//! let devices = match client.device().list().await {
//!     Err(err) if err.is_auth_failure() => {
//!         client.token().refresh().await?;
//!         client.device().list().await?
//!     }
//!     other => other?,
//! };
//! client.auth().logout().await?;
//! ```

#![warn(missing_docs)]

pub mod auth;
pub mod client;
pub mod config;
pub mod device;
pub mod eid;
pub mod error;
pub mod machine;
pub mod session;
pub mod session_info;
pub mod token;
pub mod transport;
pub mod user;

pub use auth::{AuthInput, StepUpFactor, StrengthenInput};
pub use client::IdentityClient;
pub use config::ClientConfig;
pub use error::{ErrorCode, IdentityError, Result, TransportError};
pub use session::{Session, SessionStore, TokenResponse};
