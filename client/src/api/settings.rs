use std::collections::BTreeMap;

use rabbit_types::SettingsSchema;
use serde_json::{Value, json};

use crate::{ApiClient, ApiError, ApiPath, ConnectionTest, Query, SettingsSnapshot};

const SETTINGS: &str = "/v1/settings";

impl ApiClient {
    /// `GET /v1/settings`. Sensitive rows come back masked.
    pub async fn get_system_settings(&self) -> Result<SettingsSnapshot, ApiError> {
        let value = self.get_json(&ApiPath::new(SETTINGS), &Query::new()).await?;
        serde_json::from_value(value).map_err(ApiError::Decode)
    }

    /// `GET /v1/settings/keys`.
    pub async fn get_system_settings_keys(&self) -> Result<SettingsSchema, ApiError> {
        let value = self
            .get_json(&ApiPath::new(SETTINGS).push("keys"), &Query::new())
            .await?;
        serde_json::from_value(value).map_err(ApiError::Decode)
    }

    /// `PATCH /v1/settings` with body `{"values": {...}}`.
    pub async fn update_system_settings(
        &self,
        values: &BTreeMap<String, String>,
    ) -> Result<Value, ApiError> {
        self.patch_json(&ApiPath::new(SETTINGS), &json!({ "values": values }))
            .await
    }

    pub async fn test_stripe_connection(&self) -> Result<ConnectionTest, ApiError> {
        self.connection_test("stripe").await
    }

    pub async fn test_lago_connection(&self) -> Result<ConnectionTest, ApiError> {
        self.connection_test("lago").await
    }

    pub async fn test_litellm_connection(&self) -> Result<ConnectionTest, ApiError> {
        self.connection_test("litellm").await
    }

    async fn connection_test(&self, target: &str) -> Result<ConnectionTest, ApiError> {
        let value = self
            .post_json::<Value>(
                &ApiPath::new(SETTINGS).push("test").push(target),
                &Query::new(),
                None,
            )
            .await?;
        serde_json::from_value(value).map_err(ApiError::Decode)
    }
}
