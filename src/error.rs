//! Typed error hierarchy for the aether-identity crate.
//!
//! Three failure families reach callers of an SDK operation:
//! - [`IdentityError::SessionExpired`]: a local precondition failed (no access
//!   or refresh token). Always raised before any network call. React by
//!   re-authenticating.
//! - [`IdentityError::Protocol`]: the server answered 2xx but the body did not
//!   decode into the expected shape. Indicates a client/server version mismatch.
//! - [`IdentityError::Transport`]: passed through from [`crate::transport`]
//!   unmodified. Network failures and classified non-2xx responses.
//!
//! `Config` is only produced while building a client from a
//! [`crate::config::ClientConfig`].

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::fmt;

/// Classification of a non-2xx response from the identity service.
///
/// Derived from the HTTP status plus the optional `code` / `requiresTOTP`
/// fields of the JSON error body. See [`ErrorCode::classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// 401 without a more specific code.
    AuthenticationFailed,
    /// 403.
    AuthorizationFailed,
    /// 401 with `code: "SESSION_EXPIRED"`. The server rejected the access token.
    SessionExpired,
    /// 401 with `code: "TOTP_REQUIRED"` or `requiresTOTP: true`.
    TotpRequired,
    /// `code: "DEVICE_NOT_AVAILABLE"` at any status.
    DeviceNotAvailable,
    /// Any other 4xx.
    InvalidInput,
    /// 5xx.
    ServerError,
}

impl ErrorCode {
    /// Maps a response status and the error body's hints to a code.
    ///
    /// Ordering matters: the 401 sub-cases are checked before the generic
    /// 401, and `DEVICE_NOT_AVAILABLE` wins over the 5xx bucket.
    pub fn classify(status: StatusCode, code: Option<&str>, requires_totp: bool) -> Self {
        match (status, code) {
            (StatusCode::UNAUTHORIZED, Some("SESSION_EXPIRED")) => ErrorCode::SessionExpired,
            (StatusCode::UNAUTHORIZED, Some("TOTP_REQUIRED")) => ErrorCode::TotpRequired,
            (StatusCode::UNAUTHORIZED, _) if requires_totp => ErrorCode::TotpRequired,
            (StatusCode::UNAUTHORIZED, _) => ErrorCode::AuthenticationFailed,
            (StatusCode::FORBIDDEN, _) => ErrorCode::AuthorizationFailed,
            (_, Some("DEVICE_NOT_AVAILABLE")) => ErrorCode::DeviceNotAvailable,
            (s, _) if s.is_server_error() => ErrorCode::ServerError,
            _ => ErrorCode::InvalidInput,
        }
    }

    /// Wire representation, as the service spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::AuthenticationFailed => "AUTHENTICATION_FAILED",
            ErrorCode::AuthorizationFailed => "AUTHORIZATION_FAILED",
            ErrorCode::SessionExpired => "SESSION_EXPIRED",
            ErrorCode::TotpRequired => "TOTP_REQUIRED",
            ErrorCode::DeviceNotAvailable => "DEVICE_NOT_AVAILABLE",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::ServerError => "SERVER_ERROR",
        }
    }

    /// Message used when the error body carries none.
    pub(crate) fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::AuthenticationFailed => "Authentication failed",
            ErrorCode::AuthorizationFailed => "Authorization failed",
            ErrorCode::SessionExpired => "Session expired",
            ErrorCode::TotpRequired => "TOTP verification required",
            ErrorCode::DeviceNotAvailable => "Device not available",
            ErrorCode::InvalidInput => "An error occurred",
            ErrorCode::ServerError => "Server error occurred",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by [`crate::transport::Transport`].
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The service returned a non-2xx status.
    ///
    /// `message` comes from the JSON error body when present, otherwise the
    /// code's default text. `request_id` is taken from the `X-Request-ID`
    /// header, falling back to the body's `requestId`.
    #[error("API error {status} ({code}): {message}")]
    Api {
        /// HTTP status code of the response.
        status: StatusCode,
        /// Classified error code.
        code: ErrorCode,
        /// Human-readable message.
        message: String,
        /// Server-side correlation id, if any.
        request_id: Option<String>,
    },

    /// DNS, TCP, TLS or timeout failure. No status is available.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request payload could not be serialized to JSON.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
}

impl TransportError {
    /// Network failures and 5xx responses may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Network(_) => true,
            TransportError::Api { code, .. } => *code == ErrorCode::ServerError,
            TransportError::Encode(_) => false,
        }
    }

    /// The classified code, for `Api` failures.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            TransportError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// The HTTP status, for `Api` failures.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            TransportError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Unified error type for every SDK operation.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The operation needs a token the session does not hold.
    #[error("session expired: re-authentication required")]
    SessionExpired,

    /// A 2xx response body did not match the expected shape.
    #[error("failed to decode {context} response: {source}")]
    Protocol {
        /// Which response was being decoded (e.g. `"login"`).
        context: &'static str,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// Passed through from the transport unmodified.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The client configuration was rejected.
    #[error("invalid configuration: {field}: {message}")]
    Config {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

impl IdentityError {
    /// True when the caller should refresh or re-authenticate: either the
    /// session lacks a token locally, or the server rejected the one sent.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            IdentityError::SessionExpired => true,
            IdentityError::Transport(err) => matches!(
                err.code(),
                Some(ErrorCode::AuthenticationFailed | ErrorCode::SessionExpired)
            ),
            _ => false,
        }
    }
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, IdentityError>;

/// Decodes a response body, tagging failures with `context`.
pub(crate) fn decode<T: DeserializeOwned>(body: &[u8], context: &'static str) -> Result<T> {
    serde_json::from_slice(body).map_err(|source| IdentityError::Protocol { context, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn classify_follows_status_and_code_precedence() {
        let cases = [
            (401, Some("SESSION_EXPIRED"), false, ErrorCode::SessionExpired),
            (401, Some("TOTP_REQUIRED"), false, ErrorCode::TotpRequired),
            (401, None, true, ErrorCode::TotpRequired),
            (401, Some("BAD_PASSWORD"), false, ErrorCode::AuthenticationFailed),
            (403, Some("SESSION_EXPIRED"), false, ErrorCode::AuthorizationFailed),
            (503, Some("DEVICE_NOT_AVAILABLE"), false, ErrorCode::DeviceNotAvailable),
            (500, None, false, ErrorCode::ServerError),
            (422, None, false, ErrorCode::InvalidInput),
            // requiresTOTP only matters on 401.
            (400, None, true, ErrorCode::InvalidInput),
        ];
        for (status, code, totp, expected) in cases {
            let status = StatusCode::from_u16(status).unwrap();
            assert_eq!(
                ErrorCode::classify(status, code, totp),
                expected,
                "status {status} code {code:?} totp {totp}"
            );
        }
    }

    #[test]
    fn api_error_displays_status_code_and_message() {
        let err = TransportError::Api {
            status: StatusCode::FORBIDDEN,
            code: ErrorCode::AuthorizationFailed,
            message: "missing scope devices:read".to_string(),
            request_id: Some("req-1".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("403"), "display should include status: {msg}");
        assert!(msg.contains("AUTHORIZATION_FAILED"));
        assert!(msg.contains("missing scope devices:read"));
    }

    #[test]
    fn only_network_and_server_errors_are_retryable() {
        let server = TransportError::Api {
            status: StatusCode::BAD_GATEWAY,
            code: ErrorCode::ServerError,
            message: String::new(),
            request_id: None,
        };
        let unauthorized = TransportError::Api {
            status: StatusCode::UNAUTHORIZED,
            code: ErrorCode::AuthenticationFailed,
            message: String::new(),
            request_id: None,
        };
        let encode =
            TransportError::Encode(serde_json::from_str::<String>("nope").unwrap_err());
        assert!(server.is_retryable());
        assert!(!unauthorized.is_retryable());
        assert!(!encode.is_retryable());
    }

    #[test]
    fn transport_error_passes_through_transparently() {
        let inner = TransportError::Api {
            status: StatusCode::UNAUTHORIZED,
            code: ErrorCode::SessionExpired,
            message: "token expired".to_string(),
            request_id: None,
        };
        let expected = inner.to_string();
        let err = IdentityError::from(inner);
        assert_eq!(err.to_string(), expected);
        assert!(err.is_auth_failure());
    }

    #[test]
    fn auth_failure_covers_local_and_server_rejections() {
        assert!(IdentityError::SessionExpired.is_auth_failure());

        let forbidden = IdentityError::Transport(TransportError::Api {
            status: StatusCode::FORBIDDEN,
            code: ErrorCode::AuthorizationFailed,
            message: String::new(),
            request_id: None,
        });
        assert!(
            !forbidden.is_auth_failure(),
            "403 means the token is valid but lacks rights"
        );
    }

    #[test]
    fn decode_failure_is_protocol_error_with_context() {
        let err = decode::<Vec<String>>(br#"{"not":"a list"}"#, "device list").unwrap_err();
        assert!(matches!(
            err,
            IdentityError::Protocol {
                context: "device list",
                ..
            }
        ));
        assert!(err.to_string().contains("device list"));
        assert!(err.source().is_some(), "should chain to serde_json::Error");
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<IdentityError>();
        assert_send_sync::<TransportError>();
    }
}
