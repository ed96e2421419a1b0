use rabbit_types::{
    CustomerId, EntityType, InvoiceId, MappingId, PlanId, ReportDate, SubscriptionId,
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::{ApiClient, ApiError, ApiPath, Page, Query};

const CUSTOMERS: &str = "/v1/billing/customers";
const SUBSCRIPTIONS: &str = "/v1/billing/subscriptions";
const INVOICES: &str = "/v1/billing/invoices";
const PRICE_MAPPINGS: &str = "/v1/billing/stripe/price_mappings";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCustomer {
    pub entity_type: EntityType,
    pub entity_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stripe_customer_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerQuery {
    pub q: Option<String>,
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<u64>,
    pub page: Page,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSubscription {
    pub customer_id: CustomerId,
    pub plan_id: PlanId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stripe_subscription_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionQuery {
    pub customer_id: Option<CustomerId>,
    pub plan_id: Option<PlanId>,
    pub status: Option<String>,
    pub page: Page,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceQuery {
    pub customer_id: Option<CustomerId>,
    pub status: Option<String>,
    pub page: Page,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnsureSubscription {
    pub customer_id: CustomerId,
    pub plan_id: PlanId,
    pub stripe_price_id: String,
}

/// A new plan/currency to Stripe price association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceMapping {
    pub plan_id: PlanId,
    pub stripe_price_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub active: bool,
}

/// Partial update of a price mapping; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PriceMappingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stripe_price_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl ApiClient {
    pub async fn create_customer(&self, customer: &NewCustomer) -> Result<Value, ApiError> {
        self.post_json(&ApiPath::new(CUSTOMERS), &Query::new(), Some(customer))
            .await
    }

    pub async fn list_customers(&self, query: &CustomerQuery) -> Result<Value, ApiError> {
        let params = Query::new()
            .with_text("q", query.q.as_deref())
            .with_opt("entity_type", query.entity_type)
            .with_opt("entity_id", query.entity_id);
        self.get_json(&ApiPath::new(CUSTOMERS), &query.page.apply(params))
            .await
    }

    pub async fn create_subscription(
        &self,
        subscription: &NewSubscription,
    ) -> Result<Value, ApiError> {
        self.post_json(&ApiPath::new(SUBSCRIPTIONS), &Query::new(), Some(subscription))
            .await
    }

    pub async fn list_subscriptions(&self, query: &SubscriptionQuery) -> Result<Value, ApiError> {
        let params = Query::new()
            .with_opt("customer_id", query.customer_id)
            .with_opt("plan_id", query.plan_id)
            .with_text("status", query.status.as_deref());
        self.get_json(&ApiPath::new(SUBSCRIPTIONS), &query.page.apply(params))
            .await
    }

    pub async fn get_subscription(&self, id: SubscriptionId) -> Result<Value, ApiError> {
        self.get_json(&ApiPath::new(SUBSCRIPTIONS).push(id), &Query::new())
            .await
    }

    pub async fn get_subscription_by_stripe(&self, stripe_id: &str) -> Result<Value, ApiError> {
        self.get_json(
            &ApiPath::new(SUBSCRIPTIONS).push("by_stripe").push(stripe_id),
            &Query::new(),
        )
        .await
    }

    pub async fn update_subscription_status(
        &self,
        id: SubscriptionId,
        status: &str,
    ) -> Result<Value, ApiError> {
        self.patch_json(
            &ApiPath::new(SUBSCRIPTIONS).push(id).push("status"),
            &json!({ "status": status }),
        )
        .await
    }

    /// `POST /v1/billing/invoices/generate` with the window as query parameters.
    pub async fn generate_invoice(
        &self,
        customer_id: CustomerId,
        date_from: ReportDate,
        date_to: ReportDate,
    ) -> Result<Value, ApiError> {
        self.post_json::<Value>(
            &ApiPath::new(INVOICES).push("generate"),
            &Query::new()
                .with("customer_id", customer_id)
                .with("date_from", date_from)
                .with("date_to", date_to),
            None,
        )
        .await
    }

    pub async fn list_invoices(&self, query: &InvoiceQuery) -> Result<Value, ApiError> {
        let params = Query::new()
            .with_opt("customer_id", query.customer_id)
            .with_text("status", query.status.as_deref());
        self.get_json(&ApiPath::new(INVOICES), &query.page.apply(params))
            .await
    }

    pub async fn get_invoice(&self, id: InvoiceId) -> Result<Value, ApiError> {
        self.get_json(&ApiPath::new(INVOICES).push(id), &Query::new())
            .await
    }

    pub async fn ensure_stripe_customer(&self, customer_id: CustomerId) -> Result<Value, ApiError> {
        self.post_json::<Value>(
            &ApiPath::new("/v1/billing/stripe/customers/ensure"),
            &Query::new().with("customer_id", customer_id),
            None,
        )
        .await
    }

    pub async fn ensure_stripe_subscription(
        &self,
        request: &EnsureSubscription,
    ) -> Result<Value, ApiError> {
        self.post_json(
            &ApiPath::new("/v1/billing/stripe/subscriptions/ensure"),
            &Query::new(),
            Some(request),
        )
        .await
    }

    /// Ensure a Stripe subscription using the plan's active price mapping.
    pub async fn ensure_stripe_subscription_by_plan(
        &self,
        customer_id: CustomerId,
        plan_id: PlanId,
    ) -> Result<Value, ApiError> {
        self.post_json::<Value>(
            &ApiPath::new("/v1/billing/stripe/subscriptions/ensure_by_plan"),
            &Query::new()
                .with("customer_id", customer_id)
                .with("plan_id", plan_id),
            None,
        )
        .await
    }

    pub async fn push_invoice_to_stripe(&self, invoice_id: InvoiceId) -> Result<Value, ApiError> {
        self.post_json::<Value>(
            &ApiPath::new("/v1/billing/stripe/invoices/push"),
            &Query::new().with("invoice_id", invoice_id),
            None,
        )
        .await
    }

    pub async fn list_price_mappings(&self, plan_id: Option<PlanId>) -> Result<Value, ApiError> {
        self.get_json(
            &ApiPath::new(PRICE_MAPPINGS),
            &Query::new().with_opt("plan_id", plan_id),
        )
        .await
    }

    pub async fn create_price_mapping(&self, mapping: &PriceMapping) -> Result<Value, ApiError> {
        self.post_json(&ApiPath::new(PRICE_MAPPINGS), &Query::new(), Some(mapping))
            .await
    }

    pub async fn update_price_mapping(
        &self,
        id: MappingId,
        patch: &PriceMappingPatch,
    ) -> Result<Value, ApiError> {
        self.patch_json(&ApiPath::new(PRICE_MAPPINGS).push(id), patch)
            .await
    }

    pub async fn delete_price_mapping(&self, id: MappingId) -> Result<Value, ApiError> {
        self.delete_json(&ApiPath::new(PRICE_MAPPINGS).push(id))
            .await
    }
}
