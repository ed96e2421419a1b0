use anyhow::{Context, Result, bail};
use clap::Subcommand;
use serde_json::{Map, Value};

use rabbit_client::{
    ApiClient, DailyLimit, NewPlan, PlanAssignment, PlanQuery, PriceRule, UsagePlan,
    api::DEFAULT_TIMEZONE,
};
use rabbit_types::{
    BillingCycle, EntityType, OverflowPolicy, PlanId, PlanType, PriceUnit, ResetTime,
};

use super::billing::PageArgs;
use crate::output::Output;

#[derive(Subcommand)]
pub enum PlanCommand {
    Create {
        #[arg(long)]
        name: String,
        #[arg(long = "type")]
        plan_type: PlanType,
        #[arg(long, default_value = "USD")]
        currency: String,
        /// JSON object stored with the plan
        #[arg(long)]
        meta: Option<String>,
    },
    List {
        #[arg(long)]
        q: Option<String>,
        #[arg(long = "type")]
        plan_type: Option<PlanType>,
        #[arg(long)]
        status: Option<String>,
        #[command(flatten)]
        page: PageArgs,
    },
    Get { id: PlanId },
    /// Create or replace the daily spend limit of a plan
    DailyLimit {
        #[arg(long)]
        plan_id: PlanId,
        #[arg(long)]
        cents: u64,
        #[arg(long, default_value_t)]
        overflow: OverflowPolicy,
        /// Local time of day the limit resets, HH:MM
        #[arg(long, default_value_t)]
        reset_time: ResetTime,
        #[arg(long, default_value = DEFAULT_TIMEZONE)]
        timezone: String,
    },
    /// Create or replace the usage billing terms of a plan
    Usage {
        #[arg(long)]
        plan_id: PlanId,
        #[arg(long, default_value_t)]
        cycle: BillingCycle,
        #[arg(long)]
        min_commit_cents: Option<u64>,
        #[arg(long)]
        credit_grant_cents: Option<u64>,
    },
    /// Add a per-model price rule
    PriceRule {
        #[arg(long)]
        plan_id: PlanId,
        /// Model name pattern, e.g. `gpt-4o*`
        #[arg(long)]
        model: String,
        #[arg(long, default_value_t)]
        unit: PriceUnit,
        #[arg(long)]
        base_cents: u64,
        #[arg(long)]
        input_multiplier: Option<f64>,
        #[arg(long)]
        output_multiplier: Option<f64>,
        #[arg(long)]
        price_multiplier: Option<f64>,
        #[arg(long)]
        min_charge_cents: Option<u64>,
    },
    /// Assign a plan to a user or team
    Assign {
        #[arg(long, default_value = "user")]
        entity_type: EntityType,
        #[arg(long)]
        entity_id: u64,
        #[arg(long)]
        plan_id: PlanId,
        #[arg(long, default_value = DEFAULT_TIMEZONE)]
        timezone: String,
    },
    /// Replace the metadata object of a plan
    Meta {
        plan_id: PlanId,
        /// JSON object
        meta: String,
    },
    /// Show the plan assigned to a user or team
    Assignment {
        #[arg(long, default_value = "user")]
        entity_type: EntityType,
        #[arg(long)]
        entity_id: u64,
    },
}

fn parse_meta(raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw).context("plan meta is not valid JSON")? {
        Value::Object(map) => Ok(map),
        _ => bail!("plan meta must be a JSON object"),
    }
}

pub async fn plan(client: &ApiClient, command: PlanCommand) -> Result<Output> {
    let value = match command {
        PlanCommand::Create {
            name,
            plan_type,
            currency,
            meta,
        } => {
            let plan = NewPlan {
                currency,
                meta: meta.as_deref().map(parse_meta).transpose()?,
                ..NewPlan::new(name, plan_type)
            };
            client.create_plan(&plan).await?
        }
        PlanCommand::List {
            q,
            plan_type,
            status,
            page,
        } => {
            client
                .list_plans(&PlanQuery {
                    q,
                    plan_type,
                    status,
                    page: page.page(),
                })
                .await?
        }
        PlanCommand::Get { id } => client.get_plan(id).await?,
        PlanCommand::DailyLimit {
            plan_id,
            cents,
            overflow,
            reset_time,
            timezone,
        } => {
            let limit = DailyLimit {
                overflow_policy: overflow,
                reset_time,
                timezone,
                ..DailyLimit::new(plan_id, cents)
            };
            client.upsert_daily_limit(&limit).await?
        }
        PlanCommand::Usage {
            plan_id,
            cycle,
            min_commit_cents,
            credit_grant_cents,
        } => {
            client
                .upsert_usage_plan(&UsagePlan {
                    plan_id,
                    billing_cycle: cycle,
                    min_commit_cents,
                    credit_grant_cents,
                })
                .await?
        }
        PlanCommand::PriceRule {
            plan_id,
            model,
            unit,
            base_cents,
            input_multiplier,
            output_multiplier,
            price_multiplier,
            min_charge_cents,
        } => {
            client
                .add_price_rule(&PriceRule {
                    plan_id,
                    model_pattern: model,
                    unit,
                    unit_base_price_cents: base_cents,
                    input_multiplier,
                    output_multiplier,
                    price_multiplier,
                    min_charge_cents,
                })
                .await?
        }
        PlanCommand::Assign {
            entity_type,
            entity_id,
            plan_id,
            timezone,
        } => {
            let assignment = PlanAssignment {
                timezone,
                ..PlanAssignment::new(entity_type, entity_id, plan_id)
            };
            client.assign_plan(&assignment).await?
        }
        PlanCommand::Meta { plan_id, meta } => {
            client.update_plan_meta(plan_id, parse_meta(&meta)?).await?
        }
        PlanCommand::Assignment {
            entity_type,
            entity_id,
        } => client.get_plan_assignment(entity_type, entity_id).await?,
    };
    Ok(value.into())
}
