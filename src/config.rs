//! Client configuration.
//!
//! Required fields are constructor parameters; everything else has a default
//! and a chained `with_*` override:
//!
//! ```ignore
//! use aether_identity::ClientConfig;
//! use std::time::Duration;
//!
//! let config = ClientConfig::new("https://identity.example.com", "my-app")
//!     .with_request_timeout(Duration::from_secs(10))
//!     .with_max_retries(1);
//! ```

use reqwest::header::HeaderValue;
use std::fmt;
use std::time::Duration;

use crate::error::{IdentityError, Result};

/// Connect timeout (TCP + TLS handshake).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall timeout for one request attempt, body download included.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Extra attempts the transport makes for network failures and 5xx responses.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Base delay between retries. Attempt `n` waits `n * delay`.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Settings for building an [`crate::IdentityClient`].
#[derive(Clone)]
pub struct ClientConfig {
    pub(crate) endpoint: String,
    pub(crate) client_id: String,
    pub(crate) access_token: Option<String>,
    pub(crate) connect_timeout: Duration,
    pub(crate) request_timeout: Duration,
    pub(crate) max_retries: u32,
    pub(crate) retry_delay: Duration,
}

impl ClientConfig {
    /// `endpoint` is the service base URL, e.g. `https://identity.example.com`.
    /// `client_id` is sent as `X-Client-ID` on every request and used for
    /// machine enrollment.
    pub fn new(endpoint: impl Into<String>, client_id: impl Into<String>) -> Self {
        ClientConfig {
            endpoint: endpoint.into(),
            client_id: client_id.into(),
            access_token: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Seeds the session with an access token obtained elsewhere.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Overrides [`DEFAULT_CONNECT_TIMEOUT`].
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Overrides [`DEFAULT_REQUEST_TIMEOUT`].
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Overrides [`DEFAULT_MAX_RETRIES`]. Zero disables retries.
    #[must_use]
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Overrides [`DEFAULT_RETRY_DELAY`].
    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Service base URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Application/client identifier.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Checks required fields before any client is built.
    pub fn validate(&self) -> Result<()> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(IdentityError::Config {
                field: "endpoint",
                message: "endpoint is required".to_string(),
            });
        }
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(IdentityError::Config {
                field: "endpoint",
                message: format!("endpoint must start with http:// or https://, got {endpoint:?}"),
            });
        }
        if self.client_id.trim().is_empty() {
            return Err(IdentityError::Config {
                field: "client_id",
                message: "client id is required".to_string(),
            });
        }
        if HeaderValue::from_str(&self.client_id).is_err() {
            return Err(IdentityError::Config {
                field: "client_id",
                message: format!("client id is not a valid header value: {:?}", self.client_id),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("client_id", &self.client_id)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}
