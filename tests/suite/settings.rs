//! System settings: schema fetch, masked display and the PATCH body

use rabbit_config::MemoryStore;
use rabbit_core::{FormError, SettingsForm};
use rabbit_types::{SettingError, SettingType};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{client, mount_json, start_backend};

fn settings_body() -> Value {
    json!({
        "settings": [
            {"key": "LAGO_API_URL", "value": "https://lago.internal", "masked": false},
            {"key": "STRIPE_SECRET_KEY", "value": null, "masked": true, "configured": true},
            {"key": "dev_api_key", "value": "dev-plain", "masked": false},
            {"key": "db_layer", "value": 2, "masked": false},
            {"key": "BUDGET_GRACE", "value": 5, "masked": false}
        ],
        "db_layer": 2,
        "dev_api_key_configured": true
    })
}

fn keys_body() -> Value {
    json!({
        "keys": [
            {"key": "LAGO_API_URL", "group": "lago", "type": "string", "format": "url"},
            {"key": "STRIPE_SECRET_KEY", "group": "stripe", "type": "string", "sensitive": true},
            {"key": "BUDGET_GRACE", "group": "budget", "type": "int", "min": 0}
        ],
        "groups": ["lago", "stripe", "budget"]
    })
}

async fn mount_settings(server: &wiremock::MockServer) {
    mount_json(server, "GET", "/v1/settings", 200, settings_body()).await;
    mount_json(server, "GET", "/v1/settings/keys", 200, keys_body()).await;
}

#[tokio::test]
async fn snapshot_and_schema_parse() {
    let server = start_backend().await;
    mount_settings(&server).await;
    let client = client(&server, false, MemoryStore::new());

    let snapshot = client.get_system_settings().await.unwrap();
    let schema = client.get_system_settings_keys().await.unwrap();

    assert_eq!(snapshot.db_layer, 2);
    assert!(snapshot.dev_api_key_configured);
    assert_eq!(snapshot.settings.len(), 5);
    assert_eq!(schema.keys().len(), 3);
    assert_eq!(schema.find("BUDGET_GRACE").unwrap().kind(), SettingType::Int);
    assert!(schema.find("STRIPE_SECRET_KEY").unwrap().is_sensitive());

    let form = SettingsForm::new(&snapshot, schema);
    assert!(form.entry("db_layer").is_none());
    assert_eq!(form.display_value("STRIPE_SECRET_KEY"), "••••••");
    assert_eq!(form.display_value("BUDGET_GRACE"), "5");
}

#[tokio::test]
async fn save_skips_protected_keys_and_untouched_secrets() {
    let server = start_backend().await;
    mount_settings(&server).await;
    Mock::given(method("PATCH"))
        .and(path("/v1/settings"))
        .and(body_json(json!({
            "values": {
                "BUDGET_GRACE": "10",
                "LAGO_API_URL": "https://lago.internal"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, false, MemoryStore::new());
    let snapshot = client.get_system_settings().await.unwrap();
    let schema = client.get_system_settings_keys().await.unwrap();
    let mut form = SettingsForm::new(&snapshot, schema);
    form.set_value("BUDGET_GRACE", "10");
    assert!(form.can_save());

    let values = form.prepare_save().unwrap();
    assert!(!values.contains_key("STRIPE_SECRET_KEY"));
    let result = client.update_system_settings(&values).await.unwrap();
    assert_eq!(result, json!({"ok": true}));
}

#[tokio::test]
async fn retyped_secret_is_sent() {
    let server = start_backend().await;
    mount_settings(&server).await;
    Mock::given(method("PATCH"))
        .and(path("/v1/settings"))
        .and(body_json(json!({
            "values": {
                "BUDGET_GRACE": "5",
                "LAGO_API_URL": "https://lago.internal",
                "STRIPE_SECRET_KEY": "sk_live_rotated"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, false, MemoryStore::new());
    let snapshot = client.get_system_settings().await.unwrap();
    let schema = client.get_system_settings_keys().await.unwrap();
    let mut form = SettingsForm::new(&snapshot, schema);
    form.set_value("STRIPE_SECRET_KEY", "sk_live_rotated");

    let values = form.prepare_save().unwrap();
    client.update_system_settings(&values).await.unwrap();
}

#[tokio::test]
async fn invalid_values_never_reach_the_backend() {
    let server = start_backend().await;
    mount_settings(&server).await;
    Mock::given(method("PATCH"))
        .and(path("/v1/settings"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server, false, MemoryStore::new());
    let snapshot = client.get_system_settings().await.unwrap();
    let schema = client.get_system_settings_keys().await.unwrap();
    let mut form = SettingsForm::new(&snapshot, schema);
    form.set_value("LAGO_API_URL", "lago.internal");
    form.set_value("BUDGET_GRACE", "-1");

    assert_eq!(form.error("LAGO_API_URL"), Some(&SettingError::NotUrl));
    assert_eq!(
        form.error("BUDGET_GRACE"),
        Some(&SettingError::BelowMinimum { min: 0 })
    );
    assert!(!form.can_save());
    let err = form.prepare_save().unwrap_err();
    assert!(matches!(err, FormError::Invalid { ref keys } if keys.len() == 2));
}
