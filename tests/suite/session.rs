//! Admin login, social login and the debug profile fallback

use rabbit_config::{MemoryStore, StoreKey};
use rabbit_core::SessionError;
use rabbit_core::session::{admin_login, current_profile, start_social_login};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{client, mount_json, start_backend};

#[tokio::test]
async fn rejected_admin_token_is_removed() {
    let server = start_backend().await;
    mount_json(&server, "GET", "/v1/admin/ping", 403, json!({"detail": "forbidden"})).await;

    let client = client(&server, false, MemoryStore::new());
    let err = admin_login(&client, "bad-token").await.unwrap_err();

    assert!(matches!(err, SessionError::AdminLoginFailed(_)));
    assert_eq!(client.store().get(StoreKey::AdminAuthToken), None);
}

#[tokio::test]
async fn accepted_admin_token_is_kept_and_sent() {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path("/v1/admin/ping"))
        .and(header("x-admin-auth", "good-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, false, MemoryStore::new());
    let pong = admin_login(&client, "  good-token ").await.unwrap();

    assert_eq!(pong, json!({"ok": true}));
    assert_eq!(
        client.store().get(StoreKey::AdminAuthToken).as_deref(),
        Some("good-token")
    );
}

#[tokio::test]
async fn social_login_uses_stored_provider() {
    let server = start_backend().await;
    Mock::given(method("POST"))
        .and(path("/v1/auth/social/start"))
        .and(query_param("provider", "github"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"redirect_to": "https://github.com/login/oauth"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryStore::new().with(StoreKey::SocialProvider, "github");
    let client = client(&server, false, store);
    let url = start_social_login(&client, None).await.unwrap();
    assert_eq!(url, "https://github.com/login/oauth");
}

#[tokio::test]
async fn social_login_without_redirect_fails() {
    let server = start_backend().await;
    mount_json(&server, "POST", "/v1/auth/social/start", 200, json!({"redirect_to": ""})).await;

    let client = client(&server, false, MemoryStore::new());
    let err = start_social_login(&client, None).await.unwrap_err();
    assert!(matches!(err, SessionError::MissingRedirect));
}

#[tokio::test]
async fn debug_profile_falls_back_to_dev_user_customer() {
    let server = start_backend().await;
    mount_json(&server, "GET", "/v1/me", 200, json!({"me": {"user_id": 42}})).await;
    Mock::given(method("GET"))
        .and(path("/v1/billing/customers"))
        .and(query_param("entity_type", "user"))
        .and(query_param("entity_id", "42"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "customers": [{"entity_id": 42, "name": "Ada", "email": "ada@example.com"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryStore::new().with(StoreKey::DevUserId, "42");
    let profile = current_profile(&client(&server, true, store)).await.unwrap();

    assert_eq!(profile.user_id, Some(42));
    assert_eq!(profile.name.as_deref(), Some("Ada"));
    assert_eq!(profile.email.as_deref(), Some("ada@example.com"));
}

#[tokio::test]
async fn debug_profile_adopts_latest_customer() {
    let server = start_backend().await;
    mount_json(&server, "GET", "/v1/me", 200, json!({"me": {"name": ""}})).await;
    mount_json(
        &server,
        "GET",
        "/v1/billing/customers",
        200,
        json!({"customers": [{"entity_id": 9, "name": "Grace"}]}),
    )
    .await;

    let client = client(&server, true, MemoryStore::new());
    let profile = current_profile(&client).await.unwrap();

    assert_eq!(profile.name.as_deref(), Some("Grace"));
    assert_eq!(client.store().get(StoreKey::DevUserId).as_deref(), Some("9"));
}

#[tokio::test]
async fn release_profile_never_queries_customers() {
    let server = start_backend().await;
    mount_json(&server, "GET", "/v1/me", 200, json!({"me": {"user_id": 5}})).await;
    Mock::given(method("GET"))
        .and(path("/v1/billing/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"customers": []})))
        .expect(0)
        .mount(&server)
        .await;

    let store = MemoryStore::new().with(StoreKey::DevUserId, "5");
    let profile = current_profile(&client(&server, false, store)).await.unwrap();
    assert_eq!(profile.user_id, Some(5));
    assert!(profile.name.is_none());
}

#[tokio::test]
async fn failed_fallback_keeps_backend_profile() {
    let server = start_backend().await;
    mount_json(&server, "GET", "/v1/me", 200, json!({"me": {"user_id": 3}})).await;
    mount_json(&server, "GET", "/v1/billing/customers", 500, json!({"detail": "boom"})).await;

    let client = client(&server, true, MemoryStore::new());
    let profile = current_profile(&client).await.unwrap();
    assert_eq!(profile.user_id, Some(3));
    assert_eq!(client.store().get(StoreKey::DevUserId), None);
}
