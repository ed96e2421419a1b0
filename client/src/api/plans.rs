use rabbit_types::{
    BillingCycle, EntityType, OverflowPolicy, PlanId, PlanType, PriceUnit, ResetTime,
};
use serde::Serialize;
use serde_json::{Map, Value, json};

use super::DEFAULT_TIMEZONE;
use crate::{ApiClient, ApiError, ApiPath, Page, Query};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPlan {
    pub name: String,
    #[serde(rename = "type")]
    pub plan_type: PlanType,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

impl NewPlan {
    /// A plan billed in USD with no metadata.
    #[must_use]
    pub fn new(name: impl Into<String>, plan_type: PlanType) -> Self {
        Self {
            name: name.into(),
            plan_type,
            currency: "USD".to_string(),
            meta: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanQuery {
    pub q: Option<String>,
    pub plan_type: Option<PlanType>,
    pub status: Option<String>,
    pub page: Page,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyLimit {
    pub plan_id: PlanId,
    pub daily_limit_cents: u64,
    pub overflow_policy: OverflowPolicy,
    pub reset_time: ResetTime,
    pub timezone: String,
}

impl DailyLimit {
    #[must_use]
    pub fn new(plan_id: PlanId, daily_limit_cents: u64) -> Self {
        Self {
            plan_id,
            daily_limit_cents,
            overflow_policy: OverflowPolicy::default(),
            reset_time: ResetTime::default(),
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsagePlan {
    pub plan_id: PlanId,
    pub billing_cycle: BillingCycle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_commit_cents: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_grant_cents: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRule {
    pub plan_id: PlanId,
    /// Glob-like model name pattern, e.g. `gpt-4o*`.
    pub model_pattern: String,
    pub unit: PriceUnit,
    pub unit_base_price_cents: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_multiplier: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_multiplier: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_multiplier: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_charge_cents: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanAssignment {
    pub entity_type: EntityType,
    pub entity_id: u64,
    pub plan_id: PlanId,
    pub timezone: String,
}

impl PlanAssignment {
    #[must_use]
    pub fn new(entity_type: EntityType, entity_id: u64, plan_id: PlanId) -> Self {
        Self {
            entity_type,
            entity_id,
            plan_id,
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

impl ApiClient {
    pub async fn create_plan(&self, plan: &NewPlan) -> Result<Value, ApiError> {
        self.post_json(&ApiPath::new("/v1/plans"), &Query::new(), Some(plan))
            .await
    }

    pub async fn list_plans(&self, query: &PlanQuery) -> Result<Value, ApiError> {
        let params = Query::new()
            .with_text("q", query.q.as_deref())
            .with_opt("type", query.plan_type)
            .with_text("status", query.status.as_deref());
        self.get_json(&ApiPath::new("/v1/plans"), &query.page.apply(params))
            .await
    }

    pub async fn get_plan(&self, id: PlanId) -> Result<Value, ApiError> {
        self.get_json(&ApiPath::new("/v1/plans").push(id), &Query::new())
            .await
    }

    pub async fn upsert_daily_limit(&self, limit: &DailyLimit) -> Result<Value, ApiError> {
        self.post_json(
            &ApiPath::new("/v1/plans/daily_limit"),
            &Query::new(),
            Some(limit),
        )
        .await
    }

    pub async fn upsert_usage_plan(&self, plan: &UsagePlan) -> Result<Value, ApiError> {
        self.post_json(&ApiPath::new("/v1/plans/usage"), &Query::new(), Some(plan))
            .await
    }

    pub async fn add_price_rule(&self, rule: &PriceRule) -> Result<Value, ApiError> {
        self.post_json(&ApiPath::new("/v1/plans/pricing"), &Query::new(), Some(rule))
            .await
    }

    pub async fn assign_plan(&self, assignment: &PlanAssignment) -> Result<Value, ApiError> {
        self.post_json(
            &ApiPath::new("/v1/plans/assign"),
            &Query::new(),
            Some(assignment),
        )
        .await
    }

    /// Replace the plan's free-form metadata object.
    pub async fn update_plan_meta(
        &self,
        plan_id: PlanId,
        meta: Map<String, Value>,
    ) -> Result<Value, ApiError> {
        self.post_json(
            &ApiPath::new("/v1/plans/meta"),
            &Query::new(),
            Some(&json!({ "plan_id": plan_id, "meta": meta })),
        )
        .await
    }

    /// The active plan assignment of a user or team; `assignment` is `null`
    /// when there is none.
    pub async fn get_plan_assignment(
        &self,
        entity_type: EntityType,
        entity_id: u64,
    ) -> Result<Value, ApiError> {
        self.get_json(
            &ApiPath::new("/v1/plans/assignment")
                .push(entity_type)
                .push(entity_id),
            &Query::new(),
        )
        .await
    }
}
