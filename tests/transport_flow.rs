//! Integration tests for the HTTP transport: headers, error classification
//! and retry behavior.

use std::time::Duration;

use aether_identity::transport::Transport;
use aether_identity::{ClientConfig, ErrorCode, TransportError};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport(server: &MockServer, max_retries: u32) -> Transport {
    let config = ClientConfig::new(server.uri(), "test-app")
        .with_max_retries(max_retries)
        .with_retry_delay(Duration::from_millis(10));
    Transport::new(&config).unwrap()
}

#[tokio::test]
async fn every_request_carries_client_id_and_content_type() {
    let server = MockServer::start().await;
    let t = transport(&server, 0);

    Mock::given(method("GET"))
        .and(path("/api/v1/devices"))
        .and(header("x-client-id", "test-app"))
        .and(header("content-type", "application/json"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&server)
        .await;

    let body = t.get("/api/v1/devices", Some("tok")).await.unwrap();
    assert_eq!(&body[..], b"[]");
}

#[tokio::test]
async fn empty_bearer_sends_no_authorization_header() {
    let server = MockServer::start().await;
    let t = transport(&server, 0);

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    t.get("/ping", Some("")).await.unwrap();
    t.get("/ping", None).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    for request in requests {
        assert!(request.headers.get("authorization").is_none());
    }
}

#[tokio::test]
async fn post_without_payload_sends_empty_body() {
    let server = MockServer::start().await;
    let t = transport(&server, 0);

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/logout"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    t.post::<()>("/api/v1/auth/logout", None, Some("tok"))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].body.is_empty());
}

#[tokio::test]
async fn post_serializes_payload_as_json() {
    let server = MockServer::start().await;
    let t = transport(&server, 0);

    Mock::given(method("POST"))
        .and(path("/echo"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    t.post("/echo", Some(&json!({"refreshToken": "R"})), None)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent, json!({"refreshToken": "R"}));
}

#[tokio::test]
async fn error_body_and_request_id_are_preserved() {
    let server = MockServer::start().await;
    let t = transport(&server, 0);

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .insert_header("X-Request-ID", "req-42")
                .set_body_json(json!({
                    "code": "TOTP_REQUIRED",
                    "message": "enter your code"
                })),
        )
        .mount(&server)
        .await;

    let err = t
        .post("/api/v1/auth/login", Some(&json!({})), None)
        .await
        .unwrap_err();

    match err {
        TransportError::Api {
            status,
            code,
            message,
            request_id,
        } => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(code, ErrorCode::TotpRequired);
            assert_eq!(message, "enter your code");
            assert_eq!(request_id.as_deref(), Some("req-42"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn server_errors_are_retried_until_success() {
    let server = MockServer::start().await;
    let t = transport(&server, 2);

    // Mounted first, so it takes precedence until exhausted.
    Mock::given(method("GET"))
        .and(path("/api/v1/eid/status"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/eid/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"verified": true})))
        .expect(1)
        .mount(&server)
        .await;

    let body = t.get("/api/v1/eid/status", Some("tok")).await.unwrap();
    let status: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(status["verified"], true);
}

#[tokio::test]
async fn retries_stop_after_max_retries() {
    let server = MockServer::start().await;
    let t = transport(&server, 2);

    Mock::given(method("GET"))
        .and(path("/api/v1/devices"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let err = t.get("/api/v1/devices", Some("tok")).await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::ServerError));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;
    let t = transport(&server, 3);

    Mock::given(method("GET"))
        .and(path("/api/v1/devices"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let err = t.get("/api/v1/devices", Some("tok")).await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::AuthenticationFailed));
    assert_eq!(
        err.to_string(),
        "API error 401 Unauthorized (AUTHENTICATION_FAILED): Authentication failed"
    );
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let config = ClientConfig::new("http://127.0.0.1:9", "test-app").with_max_retries(0);
    let t = Transport::new(&config).unwrap();

    let err = t.get("/api/v1/devices", None).await.unwrap_err();
    assert!(matches!(err, TransportError::Network(_)), "got {err:?}");
    assert!(err.is_retryable());
}
