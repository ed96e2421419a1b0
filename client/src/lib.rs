//! REST client for the RabbitRelay billing relay.
//!
//! # Architecture
//!
//! - [`resolve_api_base`] / [`normalize_api_base`] pick the origin for each request
//! - [`ApiClient`] composes headers, builds URLs and maps non-2xx responses to [`ApiError`]
//! - [`api`] holds one module per backend area, each adding methods to [`ApiClient`]
//!
//! # Error Handling
//!
//! Every call returns `Result<_, ApiError>`. A non-2xx response becomes
//! [`ApiError::Http`] whose `Display` is the raw response body, so callers can
//! show it verbatim. There is no retry, no timeout and no response caching.

pub mod api;
mod base;
mod client;
mod error;
mod request;
mod views;

use std::sync::OnceLock;
use std::time::Duration;

pub use api::{
    ChatMessage, ChatRequest, CheckoutRequest, CustomerQuery, DailyLimit, EnsureSubscription,
    InvoiceQuery, NewCustomer, NewPlan, NewSubscription, PeriodQuery, PlanAssignment, PlanQuery,
    PriceMapping, PriceMappingPatch, PriceRule, RefundRequest, SeedUsage, SubscriptionQuery,
    TeamPeriodQuery, TeamQuery, UsagePlan,
};
pub use base::{normalize_api_base, resolve_api_base};
pub use client::ApiClient;
pub use error::ApiError;
pub use request::{ApiPath, Page, Query};
pub use views::{
    ConnectionTest, MeResponse, Profile, ReportOutput, SettingEntry, SettingsSnapshot,
    StripeAccount,
};

pub use rabbit_types;
pub use reqwest::StatusCode;

/// Header names understood by the backend.
pub mod headers {
    /// Dev credential, sent only in debug mode.
    pub const API_KEY: &str = "x-api-key";
    /// Simulated user identity, sent only in debug mode.
    pub const DEV_USER_ID: &str = "x-dev-user-id";
    /// Admin session token for management endpoints.
    pub const ADMIN_AUTH: &str = "x-admin-auth";
    /// Per-request correlation id.
    pub const REQUEST_ID: &str = "x-request-id";
    /// Upstream proxy key for chat completions.
    pub const LITELLM_API_KEY: &str = "x-litellm-api-key";
}

// TCP Keepalive
const TCP_KEEPALIVE_SECS: u64 = 60;

// Connection pool settings
const POOL_MAX_IDLE_PER_HOST: usize = 16;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

/// Shared HTTP client. No request timeout is configured.
pub fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        base_client_builder().build().unwrap_or_else(|e| {
            tracing::error!("Failed to build HTTP client: {e}. Falling back to defaults.");
            reqwest::Client::new()
        })
    })
}

fn base_client_builder() -> reqwest::ClientBuilder {
    use reqwest::header::{HeaderMap, HeaderValue};

    let mut default_headers = HeaderMap::new();
    default_headers.insert(
        reqwest::header::USER_AGENT,
        HeaderValue::from_static(concat!("rabbit-console/", env!("CARGO_PKG_VERSION"))),
    );

    reqwest::Client::builder()
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
        .default_headers(default_headers)
}

/// Read an error body, keeping at most 32 KiB.
pub async fn read_capped_error_body(response: reqwest::Response) -> String {
    use futures_util::StreamExt;
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}
