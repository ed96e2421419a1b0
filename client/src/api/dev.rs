use rabbit_types::UserId;
use serde::Serialize;
use serde_json::Value;

use crate::{ApiClient, ApiError, ApiPath, Query};

/// Synthetic usage generation for a dev backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedUsage {
    pub user_id: UserId,
    pub count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub min_tokens: u32,
    pub max_tokens: u32,
}

impl SeedUsage {
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            count: 10,
            model: None,
            min_tokens: 100,
            max_tokens: 2000,
        }
    }
}

impl ApiClient {
    pub async fn seed_usage(&self, request: &SeedUsage) -> Result<Value, ApiError> {
        self.post_json(
            &ApiPath::new("/v1/dev/seed/usage"),
            &Query::new(),
            Some(request),
        )
        .await
    }

    /// `GET /healthz` on the backend.
    pub async fn healthz(&self) -> Result<Value, ApiError> {
        self.get_json(&ApiPath::new("/healthz"), &Query::new())
            .await
    }
}
