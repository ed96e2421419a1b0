use rabbit_types::SocialProvider;
use serde_json::{Map, Value, json};

use crate::{ApiClient, ApiError, ApiPath, MeResponse, Query};

impl ApiClient {
    /// `POST /v1/auth/social/start`. The response carries `redirect_to`.
    pub async fn start_social_login(&self, provider: SocialProvider) -> Result<Value, ApiError> {
        self.post_json::<Value>(
            &ApiPath::new("/v1/auth/social/start"),
            &Query::new().with("provider", provider),
            None,
        )
        .await
    }

    /// `POST /v1/auth/sync_profile`. `overrides` fields are merged into the
    /// body next to `access_token`.
    pub async fn sync_profile(
        &self,
        access_token: &str,
        overrides: Map<String, Value>,
    ) -> Result<Value, ApiError> {
        let mut body = Map::new();
        body.insert("access_token".to_string(), Value::from(access_token));
        body.extend(overrides);
        self.post_json(
            &ApiPath::new("/v1/auth/sync_profile"),
            &Query::new(),
            Some(&Value::Object(body)),
        )
        .await
    }

    /// `GET /v1/me`.
    pub async fn get_me(&self) -> Result<MeResponse, ApiError> {
        let value = self
            .get_json(&ApiPath::new("/v1/me"), &Query::new())
            .await?;
        serde_json::from_value(value).map_err(ApiError::Decode)
    }

    /// `PATCH /v1/me`. Absent fields are sent as `null` and left unchanged.
    pub async fn update_me(
        &self,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.patch_json(
            &ApiPath::new("/v1/me"),
            &json!({ "name": name, "email": email }),
        )
        .await
    }

    /// `GET /v1/admin/ping`. Succeeds only with a valid `x-admin-auth`.
    pub async fn admin_ping(&self) -> Result<Value, ApiError> {
        self.get_json(&ApiPath::new("/v1/admin/ping"), &Query::new())
            .await
    }
}
