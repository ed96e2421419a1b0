use rabbit_client::ApiClient;
use rabbit_config::StoreKey;
use serde::Serialize;

/// What the console believes about its backend connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthSnapshot {
    pub debug: bool,
    pub env_debug: Option<String>,
    pub env_api_base: String,
    pub api_base: String,
    pub local_api_base: Option<String>,
    pub time: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl HealthSnapshot {
    #[must_use]
    pub fn capture(client: &ApiClient) -> Self {
        let env = client.env();
        let api_base = client.api_base();
        let mut warnings = Vec::new();
        if env.debug() && api_base.is_empty() {
            tracing::warn!("Debug mode is on but no API base is configured");
            warnings.push(
                "debug mode is on but no API base is set; use --api-base or RABBIT_API_BASE"
                    .to_string(),
            );
        }
        Self {
            debug: env.debug(),
            env_debug: env.debug_raw().map(str::to_string),
            env_api_base: env.api_base().to_string(),
            api_base,
            local_api_base: client.store().get(StoreKey::ApiBase),
            time: chrono::Utc::now().to_rfc3339(),
            warnings,
        }
    }
}
