use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};

use rabbit_client::{
    ApiClient, ChatRequest, CheckoutRequest, RefundRequest, SeedUsage,
    api::DEFAULT_CHAT_MODEL,
};
use rabbit_config::StoreKey;
use rabbit_types::{Secret, UserId};

use super::user_or_dev;
use crate::output::Output;

#[derive(Subcommand)]
pub enum ProxyCommand {
    /// Send one prompt through the relay's chat completions proxy
    Chat {
        prompt: String,
        #[arg(long, default_value = DEFAULT_CHAT_MODEL)]
        model: String,
        /// System prompt; a generic assistant prompt by default
        #[arg(long)]
        system: Option<String>,
        /// `x-litellm-api-key`; remembered for later calls
        #[arg(long, env = "RABBIT_LITELLM_API_KEY", hide_env_values = true)]
        key: Option<String>,
        /// Bill these token counts instead of calling upstream
        #[arg(long)]
        input_tokens: Option<u64>,
        #[arg(long)]
        output_tokens: Option<u64>,
    },
}

#[derive(Subcommand)]
pub enum PayCommand {
    /// Create a checkout intent
    Checkout {
        #[arg(long)]
        amount_cents: u64,
        #[arg(long, default_value = "USD")]
        currency: String,
        #[arg(long, default_value = "stripe")]
        provider: String,
        #[arg(long)]
        order_id: Option<String>,
        /// Defaults to the backend's view of the dev user
        #[arg(long)]
        user_id: Option<UserId>,
    },
    /// Look up a payment
    Status {
        #[arg(long, default_value = "stripe")]
        provider: String,
        #[arg(long)]
        txn_id: Option<String>,
        #[arg(long)]
        order_id: Option<String>,
    },
    /// Refund a payment, fully unless --amount-cents is given
    Refund {
        #[arg(long, default_value = "stripe")]
        provider: String,
        #[arg(long)]
        txn_id: Option<String>,
        #[arg(long)]
        order_id: Option<String>,
        #[arg(long)]
        amount_cents: Option<u64>,
        #[arg(long)]
        reason: Option<String>,
    },
}

#[derive(Args)]
pub struct SeedArgs {
    #[arg(long)]
    user_id: Option<UserId>,
    #[arg(long, default_value_t = 10)]
    count: u32,
    #[arg(long)]
    model: Option<String>,
    #[arg(long, default_value_t = 100)]
    min_tokens: u32,
    #[arg(long, default_value_t = 2000)]
    max_tokens: u32,
}

pub async fn proxy(client: &ApiClient, command: ProxyCommand) -> Result<Output> {
    let ProxyCommand::Chat {
        prompt,
        model,
        system,
        key,
        input_tokens,
        output_tokens,
    } = command;

    let store = client.store();
    let key = match key.and_then(Secret::new) {
        Some(key) => {
            store.set(StoreKey::LitellmApiKey, key.expose())?;
            key
        }
        None => store
            .get_non_empty(StoreKey::LitellmApiKey)
            .and_then(Secret::new)
            .context("no LiteLLM key; pass --key or set RABBIT_LITELLM_API_KEY")?,
    };

    let request = ChatRequest {
        input_tokens,
        output_tokens,
        ..ChatRequest::prompt(model, system.as_deref(), prompt)
    };
    Ok(client.chat_completions(&request, &key).await?.into())
}

pub async fn pay(client: &ApiClient, command: PayCommand) -> Result<Output> {
    let value = match command {
        PayCommand::Checkout {
            amount_cents,
            currency,
            provider,
            order_id,
            user_id,
        } => {
            client
                .create_checkout_intent(&CheckoutRequest {
                    user_id,
                    amount_cents,
                    currency,
                    provider,
                    order_id,
                })
                .await?
        }
        PayCommand::Status {
            provider,
            txn_id,
            order_id,
        } => {
            if txn_id.is_none() && order_id.is_none() {
                bail!("pass --txn-id or --order-id");
            }
            client
                .payment_status(&provider, txn_id.as_deref(), order_id.as_deref())
                .await?
        }
        PayCommand::Refund {
            provider,
            txn_id,
            order_id,
            amount_cents,
            reason,
        } => {
            if txn_id.is_none() && order_id.is_none() {
                bail!("pass --txn-id or --order-id");
            }
            client
                .refund(&RefundRequest {
                    provider,
                    provider_txn_id: txn_id,
                    order_id,
                    amount_cents,
                    reason,
                })
                .await?
        }
    };
    Ok(value.into())
}

pub async fn seed(client: &ApiClient, args: SeedArgs) -> Result<Output> {
    if args.min_tokens > args.max_tokens {
        bail!("--min-tokens must be <= --max-tokens");
    }
    let request = SeedUsage {
        count: args.count,
        model: args.model,
        min_tokens: args.min_tokens,
        max_tokens: args.max_tokens,
        ..SeedUsage::new(user_or_dev(client, args.user_id)?)
    };
    Ok(client.seed_usage(&request).await?.into())
}
