//! Non-2xx bodies surface verbatim; empty bodies decode to null

use rabbit_client::{ApiError, StatusCode};
use rabbit_config::MemoryStore;
use rabbit_core::SessionError;
use rabbit_core::errors::{error_detail, hint_for};
use rabbit_core::session::current_profile;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{client, mount_json, start_backend};

#[tokio::test]
async fn server_error_body_is_the_error_text() {
    let server = start_backend().await;
    let body = r#"{"detail":"ledger unavailable"}"#;
    Mock::given(method("GET"))
        .and(path("/healthz"))
        .respond_with(ResponseTemplate::new(500).set_body_string(body))
        .mount(&server)
        .await;

    let err = client(&server, false, MemoryStore::new())
        .healthz()
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(err.to_string(), body);
    assert_eq!(error_detail(&err.to_string()).as_deref(), Some("ledger unavailable"));
}

#[tokio::test]
async fn empty_success_body_is_null() {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path("/v1/admin/ping"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let value = client(&server, false, MemoryStore::new())
        .admin_ping()
        .await
        .unwrap();
    assert_eq!(value, Value::Null);
}

#[tokio::test]
async fn missing_session_maps_to_not_logged_in() {
    let server = start_backend().await;
    mount_json(&server, "GET", "/v1/me", 401, json!({"detail": "not_logged_in"})).await;

    let client = client(&server, false, MemoryStore::new());
    let err = current_profile(&client).await.unwrap_err();
    assert!(matches!(err, SessionError::NotLoggedIn));
}

#[tokio::test]
async fn forbidden_admin_call_gets_a_hint() {
    let server = start_backend().await;
    mount_json(&server, "GET", "/v1/admin/ping", 403, json!({"detail": "forbidden"})).await;

    let err = client(&server, false, MemoryStore::new())
        .admin_ping()
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Http { .. }));
    assert!(hint_for(&err, false).is_some());
}
