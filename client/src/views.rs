//! Typed views over the few responses a local workflow needs to inspect.
//!
//! Everything else is returned as `serde_json::Value`. These views are
//! lenient: missing fields default, unknown fields are ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Output of a report endpoint that can answer in JSON or CSV.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutput {
    Json(Value),
    /// Raw CSV text exactly as the backend sent it.
    Csv(String),
}

/// `GET /v1/me`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeResponse {
    pub request_id: Option<String>,
    pub me: Profile,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub user_id: Option<u64>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Profile {
    /// Whether the backend returned a usable display name.
    #[must_use]
    pub fn has_name(&self) -> bool {
        self.name.as_deref().is_some_and(|name| !name.trim().is_empty())
    }
}

/// `GET /v1/settings`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SettingsSnapshot {
    pub settings: Vec<SettingEntry>,
    pub db_layer: i64,
    pub dev_api_key_configured: bool,
}

/// One stored setting. Sensitive rows come back masked with no value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SettingEntry {
    pub key: String,
    pub value: Option<Value>,
    pub masked: bool,
    pub configured: Option<bool>,
    pub updated_at: Option<String>,
}

impl SettingEntry {
    /// The value as form text. Strings are unquoted; `null` is empty.
    #[must_use]
    pub fn value_text(&self) -> String {
        match &self.value {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// `POST /v1/settings/test/{stripe,lago,litellm}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionTest {
    pub ok: bool,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<u16>,
    pub endpoint: Option<String>,
    pub snippet: Option<String>,
    pub error: Option<String>,
    pub account: Option<StripeAccount>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripeAccount {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ConnectionTest, MeResponse, SettingsSnapshot};

    #[test]
    fn me_tolerates_nulls() {
        let me: MeResponse = serde_json::from_value(json!({
            "request_id": "r1",
            "me": {"user_id": 3, "name": null, "email": null}
        }))
        .unwrap();
        assert_eq!(me.me.user_id, Some(3));
        assert!(!me.me.has_name());
    }

    #[test]
    fn settings_snapshot_handles_masked_rows() {
        let snapshot: SettingsSnapshot = serde_json::from_value(json!({
            "settings": [
                {"key": "STRIPE_SECRET_KEY", "masked": true, "configured": true},
                {"key": "RATE_LIMIT_WINDOW_SEC", "masked": false, "value": "60"},
                {"key": "LAGO_EVENTS_ENABLED", "masked": false, "value": true}
            ],
            "db_layer": 2,
            "dev_api_key_configured": false
        }))
        .unwrap();
        assert_eq!(snapshot.db_layer, 2);
        assert_eq!(snapshot.settings[0].value_text(), "");
        assert_eq!(snapshot.settings[0].configured, Some(true));
        assert_eq!(snapshot.settings[1].value_text(), "60");
        assert_eq!(snapshot.settings[2].value_text(), "true");
    }

    #[test]
    fn connection_test_reads_stripe_account() {
        let result: ConnectionTest = serde_json::from_value(json!({
            "ok": true,
            "type": "stripe",
            "account": {"id": "acct_1", "name": "Acme"}
        }))
        .unwrap();
        assert!(result.ok);
        assert_eq!(result.account.unwrap().name.as_deref(), Some("Acme"));
    }
}
