use anyhow::{Result, bail};
use clap::{Args, Subcommand};

use rabbit_client::{
    ApiClient, CustomerQuery, EnsureSubscription, InvoiceQuery, NewCustomer, NewSubscription,
    Page, PriceMapping, PriceMappingPatch, SubscriptionQuery,
};
use rabbit_types::{
    CustomerId, EntityType, InvoiceId, MappingId, PlanId, ReportDate, SubscriptionId,
};

use crate::output::Output;

#[derive(Args)]
pub struct PageArgs {
    #[arg(long, default_value_t = 50)]
    limit: u32,
    #[arg(long, default_value_t = 0)]
    offset: u32,
}

impl PageArgs {
    pub(super) fn page(&self) -> Page {
        Page::new(self.limit, self.offset)
    }
}

#[derive(Subcommand)]
pub enum CustomerCommand {
    Create {
        #[arg(long, default_value = "user")]
        entity_type: EntityType,
        #[arg(long)]
        entity_id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        stripe_customer_id: Option<String>,
    },
    List {
        /// Free-text search
        #[arg(long)]
        q: Option<String>,
        #[arg(long)]
        entity_type: Option<EntityType>,
        #[arg(long)]
        entity_id: Option<u64>,
        #[command(flatten)]
        page: PageArgs,
    },
}

#[derive(Subcommand)]
pub enum SubscriptionCommand {
    Create {
        #[arg(long)]
        customer_id: CustomerId,
        #[arg(long)]
        plan_id: PlanId,
        #[arg(long)]
        stripe_subscription_id: Option<String>,
    },
    List {
        #[arg(long)]
        customer_id: Option<CustomerId>,
        #[arg(long)]
        plan_id: Option<PlanId>,
        #[arg(long)]
        status: Option<String>,
        #[command(flatten)]
        page: PageArgs,
    },
    Get { id: SubscriptionId },
    /// Look a subscription up by its Stripe id
    ByStripe { stripe_subscription_id: String },
    /// Change the status, e.g. `active` or `canceled`
    SetStatus { id: SubscriptionId, status: String },
}

#[derive(Subcommand)]
pub enum InvoiceCommand {
    /// Generate an invoice for a customer over a date range
    Generate {
        #[arg(long)]
        customer_id: CustomerId,
        #[arg(long = "from")]
        date_from: ReportDate,
        #[arg(long = "to")]
        date_to: ReportDate,
    },
    List {
        #[arg(long)]
        customer_id: Option<CustomerId>,
        #[arg(long)]
        status: Option<String>,
        #[command(flatten)]
        page: PageArgs,
    },
    Get { id: InvoiceId },
}

#[derive(Subcommand)]
pub enum StripeCommand {
    /// Create the Stripe customer for a billing customer if missing
    EnsureCustomer { customer_id: CustomerId },
    /// Create the Stripe subscription if missing; without --price-id the
    /// plan's price mapping is used
    EnsureSubscription {
        #[arg(long)]
        customer_id: CustomerId,
        #[arg(long)]
        plan_id: PlanId,
        #[arg(long)]
        price_id: Option<String>,
    },
    /// Push a generated invoice to Stripe
    PushInvoice { invoice_id: InvoiceId },
    /// Show the Stripe publishable key
    PublishableKey,
}

#[derive(Subcommand)]
pub enum PriceMappingCommand {
    List {
        #[arg(long)]
        plan_id: Option<PlanId>,
    },
    Create {
        #[arg(long)]
        plan_id: PlanId,
        #[arg(long)]
        price_id: String,
        #[arg(long)]
        currency: Option<String>,
        /// Create the mapping disabled
        #[arg(long)]
        inactive: bool,
    },
    Update {
        id: MappingId,
        #[arg(long)]
        price_id: Option<String>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    Delete { id: MappingId },
}

pub async fn customer(client: &ApiClient, command: CustomerCommand) -> Result<Output> {
    let value = match command {
        CustomerCommand::Create {
            entity_type,
            entity_id,
            name,
            email,
            stripe_customer_id,
        } => {
            client
                .create_customer(&NewCustomer {
                    entity_type,
                    entity_id,
                    name,
                    email,
                    stripe_customer_id,
                })
                .await?
        }
        CustomerCommand::List {
            q,
            entity_type,
            entity_id,
            page,
        } => {
            client
                .list_customers(&CustomerQuery {
                    q,
                    entity_type,
                    entity_id,
                    page: page.page(),
                })
                .await?
        }
    };
    Ok(value.into())
}

pub async fn subscription(client: &ApiClient, command: SubscriptionCommand) -> Result<Output> {
    let value = match command {
        SubscriptionCommand::Create {
            customer_id,
            plan_id,
            stripe_subscription_id,
        } => {
            client
                .create_subscription(&NewSubscription {
                    customer_id,
                    plan_id,
                    stripe_subscription_id,
                })
                .await?
        }
        SubscriptionCommand::List {
            customer_id,
            plan_id,
            status,
            page,
        } => {
            client
                .list_subscriptions(&SubscriptionQuery {
                    customer_id,
                    plan_id,
                    status,
                    page: page.page(),
                })
                .await?
        }
        SubscriptionCommand::Get { id } => client.get_subscription(id).await?,
        SubscriptionCommand::ByStripe {
            stripe_subscription_id,
        } => {
            client
                .get_subscription_by_stripe(&stripe_subscription_id)
                .await?
        }
        SubscriptionCommand::SetStatus { id, status } => {
            client.update_subscription_status(id, &status).await?
        }
    };
    Ok(value.into())
}

pub async fn invoice(client: &ApiClient, command: InvoiceCommand) -> Result<Output> {
    let value = match command {
        InvoiceCommand::Generate {
            customer_id,
            date_from,
            date_to,
        } => {
            if date_to < date_from {
                bail!("--to must not be before --from");
            }
            client
                .generate_invoice(customer_id, date_from, date_to)
                .await?
        }
        InvoiceCommand::List {
            customer_id,
            status,
            page,
        } => {
            client
                .list_invoices(&InvoiceQuery {
                    customer_id,
                    status,
                    page: page.page(),
                })
                .await?
        }
        InvoiceCommand::Get { id } => client.get_invoice(id).await?,
    };
    Ok(value.into())
}

pub async fn stripe(client: &ApiClient, command: StripeCommand) -> Result<Output> {
    let value = match command {
        StripeCommand::EnsureCustomer { customer_id } => {
            client.ensure_stripe_customer(customer_id).await?
        }
        StripeCommand::EnsureSubscription {
            customer_id,
            plan_id,
            price_id: Some(stripe_price_id),
        } => {
            client
                .ensure_stripe_subscription(&EnsureSubscription {
                    customer_id,
                    plan_id,
                    stripe_price_id,
                })
                .await?
        }
        StripeCommand::EnsureSubscription {
            customer_id,
            plan_id,
            price_id: None,
        } => {
            client
                .ensure_stripe_subscription_by_plan(customer_id, plan_id)
                .await?
        }
        StripeCommand::PushInvoice { invoice_id } => {
            client.push_invoice_to_stripe(invoice_id).await?
        }
        StripeCommand::PublishableKey => client.stripe_publishable_key().await?,
    };
    Ok(value.into())
}

pub async fn price_mapping(client: &ApiClient, command: PriceMappingCommand) -> Result<Output> {
    let value = match command {
        PriceMappingCommand::List { plan_id } => client.list_price_mappings(plan_id).await?,
        PriceMappingCommand::Create {
            plan_id,
            price_id,
            currency,
            inactive,
        } => {
            client
                .create_price_mapping(&PriceMapping {
                    plan_id,
                    stripe_price_id: price_id,
                    currency,
                    active: !inactive,
                })
                .await?
        }
        PriceMappingCommand::Update {
            id,
            price_id,
            currency,
            active,
        } => {
            let patch = PriceMappingPatch {
                stripe_price_id: price_id,
                currency,
                active,
            };
            if patch == PriceMappingPatch::default() {
                bail!("nothing to change; pass --price-id, --currency or --active");
            }
            client.update_price_mapping(id, &patch).await?
        }
        PriceMappingCommand::Delete { id } => client.delete_price_mapping(id).await?,
    };
    Ok(value.into())
}
