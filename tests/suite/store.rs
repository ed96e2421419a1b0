//! The file-backed store shared with a live client

use std::sync::Arc;

use rabbit_client::ApiClient;
use rabbit_config::{BuildEnv, EnvOverrides, KeyValueStore, LocalStore, StoreKey, write_env_on_start};
use rabbit_core::{DevSettings, DevSettingsUpdate};
use rabbit_types::SocialProvider;
use serde_json::json;

use crate::common::{mount_json, start_backend};

#[tokio::test]
async fn api_base_override_persists_across_reopen() {
    let build_default = start_backend().await;
    let local = start_backend().await;
    mount_json(&local, "GET", "/healthz", 200, json!({"from": "local"})).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".rabbit").join("local.toml");

    let update = DevSettingsUpdate {
        api_base: Some(local.uri()),
        social_provider: Some(SocialProvider::Github),
        ..DevSettingsUpdate::default()
    };
    update.apply(&LocalStore::open(&path).unwrap()).unwrap();

    let store = Arc::new(LocalStore::open(&path).unwrap());
    let client = ApiClient::new(BuildEnv::new(build_default.uri(), true), store.clone());
    let body = client.healthz().await.unwrap();
    assert_eq!(body["from"], "local");

    let shown = DevSettings::load(store.as_ref());
    assert_eq!(shown.social_provider, SocialProvider::Github);
    assert_eq!(shown.api_base, Some(local.uri()));
}

#[test]
fn env_write_back_lands_in_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local.toml");
    let env = BuildEnv::new("relay.example.com/", true).with_overrides(&EnvOverrides {
        write_env: true,
        ..EnvOverrides::default()
    });

    let snapshot = write_env_on_start(&env, &LocalStore::open(&path).unwrap()).unwrap();
    assert_eq!(snapshot.env_api_base, "relay.example.com/");

    let reopened = LocalStore::open(&path).unwrap();
    assert_eq!(
        reopened.get(StoreKey::ApiBase).as_deref(),
        Some("relay.example.com/")
    );
    let stored = reopened.get(StoreKey::EnvWritebackSnapshot).unwrap();
    assert!(stored.contains("\"env_api_base\":\"relay.example.com/\""));
}
