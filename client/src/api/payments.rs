use rabbit_types::UserId;
use serde::Serialize;
use serde_json::Value;

use crate::{ApiClient, ApiError, ApiPath, Query};

/// `POST /v1/payments/checkout`. Without `user_id` the backend falls back to
/// the `x-dev-user-id` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub amount_cents: u64,
    pub currency: String,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

/// `POST /v1/payments/refund`. Identify the payment by `provider_txn_id` or
/// `order_id`; omit `amount_cents` for a full refund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefundRequest {
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_txn_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_cents: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ApiClient {
    pub async fn create_checkout_intent(
        &self,
        request: &CheckoutRequest,
    ) -> Result<Value, ApiError> {
        self.post_json(
            &ApiPath::new("/v1/payments/checkout"),
            &Query::new(),
            Some(request),
        )
        .await
    }

    pub async fn payment_status(
        &self,
        provider: &str,
        provider_txn_id: Option<&str>,
        order_id: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.get_json(
            &ApiPath::new("/v1/payments/status"),
            &Query::new()
                .with("provider", provider)
                .with_text("provider_txn_id", provider_txn_id)
                .with_text("order_id", order_id),
        )
        .await
    }

    pub async fn refund(&self, request: &RefundRequest) -> Result<Value, ApiError> {
        self.post_json(
            &ApiPath::new("/v1/payments/refund"),
            &Query::new(),
            Some(request),
        )
        .await
    }

    /// `GET /v1/config/stripe`, answering `{"publishable_key": ...}`.
    pub async fn stripe_publishable_key(&self) -> Result<Value, ApiError> {
        self.get_json(&ApiPath::new("/v1/config/stripe"), &Query::new())
            .await
    }
}
