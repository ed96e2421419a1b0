//! Header composition and API base selection against a live mock

use rabbit_config::{MemoryStore, StoreKey};
use serde_json::json;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{client, mount_json, single_request_header, start_backend};

fn dev_store() -> MemoryStore {
    MemoryStore::new()
        .with(StoreKey::DevApiKey, "dev-key")
        .with(StoreKey::DevUserId, "7")
}

#[tokio::test]
async fn debug_mode_sends_dev_credentials() {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path("/healthz"))
        .and(header("x-api-key", "dev-key"))
        .and(header("x-dev-user-id", "7"))
        .and(header("content-type", "application/json"))
        .and(header_exists("x-request-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let body = client(&server, true, dev_store()).healthz().await.unwrap();
    assert_eq!(body, json!({"ok": true}));
}

#[tokio::test]
async fn release_mode_omits_dev_credentials() {
    let server = start_backend().await;
    mount_json(&server, "GET", "/healthz", 200, json!({"ok": true})).await;

    client(&server, false, dev_store()).healthz().await.unwrap();

    assert!(single_request_header(&server, "x-api-key").await.is_none());
    assert!(single_request_header(&server, "x-dev-user-id").await.is_none());
}

#[tokio::test]
async fn admin_token_is_sent_in_release_mode() {
    let server = start_backend().await;
    mount_json(&server, "GET", "/v1/admin/ping", 200, json!({"ok": true})).await;

    let store = MemoryStore::new().with(StoreKey::AdminAuthToken, "adm-token");
    client(&server, false, store).admin_ping().await.unwrap();

    assert_eq!(
        single_request_header(&server, "x-admin-auth").await.as_deref(),
        Some("adm-token")
    );
}

#[tokio::test]
async fn local_api_base_wins_only_in_debug() {
    let build_default = start_backend().await;
    let local = start_backend().await;
    mount_json(&build_default, "GET", "/healthz", 200, json!({"from": "build"})).await;
    mount_json(&local, "GET", "/healthz", 200, json!({"from": "local"})).await;

    let store = || MemoryStore::new().with(StoreKey::ApiBase, &local.uri());

    let body = client(&build_default, true, store()).healthz().await.unwrap();
    assert_eq!(body["from"], "local");

    let body = client(&build_default, false, store()).healthz().await.unwrap();
    assert_eq!(body["from"], "build");
}
