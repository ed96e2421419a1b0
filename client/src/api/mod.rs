//! Request builders, one module per backend area.
//!
//! Each module extends [`ApiClient`](crate::ApiClient) with the calls for its
//! area and defines the request bodies/queries those calls take. Responses are
//! returned as `serde_json::Value` unless a local workflow needs structure.

mod auth;
mod billing;
mod dev;
mod payments;
mod plans;
mod proxy;
mod reports;
mod settings;
mod teams;

pub use billing::{
    CustomerQuery, EnsureSubscription, InvoiceQuery, NewCustomer, NewSubscription, PriceMapping,
    PriceMappingPatch, SubscriptionQuery,
};
pub use dev::SeedUsage;
pub use payments::{CheckoutRequest, RefundRequest};
pub use plans::{DailyLimit, NewPlan, PlanAssignment, PlanQuery, PriceRule, UsagePlan};
pub use proxy::{ChatMessage, ChatRequest, DEFAULT_CHAT_MODEL, DEFAULT_SYSTEM_PROMPT};
pub use reports::{PeriodQuery, TeamPeriodQuery};
pub use teams::TeamQuery;

/// Timezone the backend applies to daily windows unless told otherwise.
pub const DEFAULT_TIMEZONE: &str = "UTC+8";
