use rabbit_types::Secret;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::client::decode_json;
use crate::{ApiClient, ApiError, ApiPath, Query, headers};

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Body of `POST /v1/proxy/chat/completions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    /// Usage hints the relay bills directly instead of calling upstream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
}

impl ChatRequest {
    /// A single user prompt preceded by `system`, or the default system
    /// prompt when `system` is `None`.
    #[must_use]
    pub fn prompt(model: impl Into<String>, system: Option<&str>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![
                ChatMessage::system(system.unwrap_or(DEFAULT_SYSTEM_PROMPT)),
                ChatMessage::user(prompt),
            ],
            input_tokens: None,
            output_tokens: None,
        }
    }
}

impl ApiClient {
    /// Relay a chat completion through the proxy, authenticating upstream
    /// with `x-litellm-api-key`.
    pub async fn chat_completions(
        &self,
        request: &ChatRequest,
        litellm_key: &Secret,
    ) -> Result<Value, ApiError> {
        let response = self
            .send(
                Method::POST,
                &ApiPath::new("/v1/proxy/chat/completions"),
                &Query::new(),
                Some(request),
                &[(headers::LITELLM_API_KEY, litellm_key.expose())],
            )
            .await?;
        decode_json(response).await
    }
}
