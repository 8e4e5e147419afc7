//! HTTP transport for the identity service.
//!
//! `Transport` wraps a `reqwest::Client` and exposes the two verbs the SDK
//! needs: [`Transport::get`] and [`Transport::post`]. Both return the raw
//! response body on 2xx; decoding is left to the calling module so that a
//! malformed body surfaces as [`crate::IdentityError::Protocol`] rather than
//! a transport failure.
//!
//! Request shape:
//! - `Content-Type: application/json` and `X-Client-ID` on every request.
//! - `Authorization: Bearer <token>` only when a non-empty token is given.
//!
//! Failure handling:
//! - Non-2xx responses are classified into [`ErrorCode`] from the status and
//!   the JSON error body (`message`, `code`, `requiresTOTP`, `requestId`).
//! - Network failures and 5xx responses are retried up to `max_retries`
//!   times with linear backoff. 4xx responses are never retried.
//! - Cancellation is by drop: dropping the returned future aborts the
//!   in-flight request and any pending backoff sleep.

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Client, Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ErrorCode, TransportError};

/// Header carrying the application identifier.
const CLIENT_ID_HEADER: &str = "X-Client-ID";

/// Header the service uses for its correlation id.
const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Error body returned by the service on non-2xx responses. Every field is
/// optional; an unparseable body yields the all-`None` default.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default, rename = "requiresTOTP")]
    requires_totp: bool,
    #[serde(default)]
    request_id: Option<String>,
}

/// Authenticated-or-anonymous HTTP access to the identity service.
///
/// Holds no session state: the bearer token is supplied per call by the
/// module making the request.
pub struct Transport {
    client: Client,
    base_url: String,
    client_id: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl Transport {
    /// Builds the underlying `reqwest::Client` with the configured timeouts.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Transport {
            client,
            base_url: config.endpoint.trim().trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
        })
    }

    /// Sends a GET request. `bearer` of `None` or `Some("")` sends no
    /// `Authorization` header.
    pub async fn get(&self, path: &str, bearer: Option<&str>) -> Result<Bytes, TransportError> {
        self.send(Method::GET, path, None, bearer).await
    }

    /// Sends a POST request with an optional JSON body.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
        bearer: Option<&str>,
    ) -> Result<Bytes, TransportError> {
        let payload = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(TransportError::Encode)?
            .map(Bytes::from);
        self.send(Method::POST, path, payload, bearer).await
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Linear backoff before retry number `attempt`, saturating at
    /// `Duration::MAX`.
    fn backoff(&self, attempt: u32) -> Duration {
        self.retry_delay.saturating_mul(attempt)
    }

    /// Runs one logical request, retrying retryable failures.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Bytes>,
        bearer: Option<&str>,
    ) -> Result<Bytes, TransportError> {
        let url = self.url_for(path);
        let bearer = bearer.filter(|token| !token.is_empty());
        let mut attempt: u32 = 0;

        loop {
            debug!(
                method = %method,
                path,
                attempt,
                authenticated = bearer.is_some(),
                "sending request"
            );
            match self.execute(method.clone(), &url, body.clone(), bearer).await {
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.backoff(attempt);
                    warn!(
                        method = %method,
                        path,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "retrying request"
                    );
                    tokio::time::sleep(delay).await;
                }
                result => return result,
            }
        }
    }

    /// A single attempt: send, then read the body or classify the failure.
    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<Bytes>,
        bearer: Option<&str>,
    ) -> Result<Bytes, TransportError> {
        let mut req = self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(CLIENT_ID_HEADER, &self.client_id);
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }
        if let Some(payload) = body {
            req = req.body(payload);
        }

        let resp = req.send().await?;
        let status = resp.status();
        debug!(status = status.as_u16(), url, "received response");

        if status.is_success() {
            return Ok(resp.bytes().await?);
        }
        Err(classify_failure(status, resp).await)
    }
}

/// Turns a non-2xx response into `TransportError::Api`.
///
/// The body is read as text first so the service's message survives; a
/// body that is not the expected JSON shape still yields a classified error.
async fn classify_failure(status: StatusCode, resp: Response) -> TransportError {
    let header_request_id = resp
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned);
    let text = resp.text().await.unwrap_or_default();
    api_error(status, &text, header_request_id)
}

fn api_error(status: StatusCode, body: &str, header_request_id: Option<String>) -> TransportError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let code = ErrorCode::classify(status, parsed.code.as_deref(), parsed.requires_totp);
    let message = parsed
        .message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| code.default_message().to_string());

    TransportError::Api {
        status,
        code,
        message,
        request_id: header_request_id.or(parsed.request_id.filter(|id| !id.is_empty())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport_for(endpoint: &str) -> Transport {
        Transport::new(&ClientConfig::new(endpoint, "app")).unwrap()
    }

    #[test]
    fn url_joins_without_double_slash() {
        let t = transport_for("https://id.example.com/");
        assert_eq!(
            t.url_for("/api/v1/auth/login"),
            "https://id.example.com/api/v1/auth/login"
        );
    }

    #[test]
    fn url_keeps_endpoint_path_prefix() {
        let t = transport_for("https://example.com/identity");
        assert_eq!(
            t.url_for("/oauth2/token"),
            "https://example.com/identity/oauth2/token"
        );
    }

    #[test]
    fn backoff_grows_linearly() {
        let config = ClientConfig::new("https://id.example.com", "app")
            .with_retry_delay(Duration::from_millis(100));
        let t = Transport::new(&config).unwrap();
        assert_eq!(t.backoff(1), Duration::from_millis(100));
        assert_eq!(t.backoff(3), Duration::from_millis(300));
    }

    #[test]
    fn backoff_saturates_instead_of_overflowing() {
        let config =
            ClientConfig::new("https://id.example.com", "app").with_retry_delay(Duration::MAX);
        let t = Transport::new(&config).unwrap();
        assert_eq!(t.backoff(2), Duration::MAX);
        assert_eq!(t.backoff(u32::MAX), Duration::MAX);
    }

    #[test]
    fn api_error_uses_body_message_and_code() {
        let err = api_error(
            StatusCode::UNAUTHORIZED,
            r#"{"message":"code required","requiresTOTP":true,"requestId":"body-id"}"#,
            None,
        );
        match err {
            TransportError::Api {
                code,
                message,
                request_id,
                ..
            } => {
                assert_eq!(code, ErrorCode::TotpRequired);
                assert_eq!(message, "code required");
                assert_eq!(request_id.as_deref(), Some("body-id"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn api_error_prefers_header_request_id() {
        let err = api_error(
            StatusCode::FORBIDDEN,
            r#"{"requestId":"body-id"}"#,
            Some("header-id".to_string()),
        );
        assert!(matches!(
            err,
            TransportError::Api { request_id: Some(ref id), .. } if id == "header-id"
        ));
    }

    #[test]
    fn api_error_tolerates_non_json_body() {
        let err = api_error(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>", None);
        match err {
            TransportError::Api { code, message, .. } => {
                assert_eq!(code, ErrorCode::ServerError);
                assert_eq!(message, "Server error occurred");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
