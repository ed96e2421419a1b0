use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use serde_json::{Map, Value, json};

use rabbit_client::ApiClient;
use rabbit_core::{DevSettings, DevSettingsUpdate, HealthSnapshot, session};
use rabbit_types::SocialProvider;

use crate::output::Output;

#[derive(Args)]
pub struct HealthArgs {
    /// Only show local configuration; do not call the backend
    #[arg(long)]
    offline: bool,
}

#[derive(Subcommand)]
pub enum DevCommand {
    /// Show the stored dev settings (the API key is masked)
    Show,
    /// Change dev settings; an empty value clears it
    Set(DevSetArgs),
}

#[derive(Args)]
pub struct DevSetArgs {
    /// Value sent as `x-api-key` in debug mode
    #[arg(long)]
    api_key: Option<String>,
    /// Value sent as `x-dev-user-id` in debug mode
    #[arg(long)]
    user_id: Option<String>,
    #[arg(long)]
    provider: Option<SocialProvider>,
    /// Local API base override, honoured in debug mode
    #[arg(long = "base")]
    base: Option<String>,
}

#[derive(Args)]
pub struct LoginArgs {
    /// Defaults to the stored social provider, else google
    #[arg(long)]
    provider: Option<SocialProvider>,
}

#[derive(Subcommand)]
pub enum MeCommand {
    /// Show the current profile
    Show,
    /// Change name or email
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Exchange an identity-provider access token for a profile
    Sync {
        access_token: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Store an admin token and verify it
    Login { token: String },
    /// Check the stored admin token
    Ping,
}

pub async fn health(client: &ApiClient, args: HealthArgs) -> Result<Output> {
    let snapshot = HealthSnapshot::capture(client);
    let mut report = serde_json::to_value(&snapshot)?;
    if !args.offline
        && let Value::Object(fields) = &mut report
    {
        let backend = match client.healthz().await {
            Ok(value) => value,
            Err(e) => json!({ "error": e.to_string() }),
        };
        fields.insert("backend".to_string(), backend);
    }
    Ok(Output::Json(report))
}

pub fn dev(client: &ApiClient, command: DevCommand) -> Result<Output> {
    let store = client.store();
    match command {
        DevCommand::Show => Output::json(DevSettings::load(store)),
        DevCommand::Set(args) => {
            let update = DevSettingsUpdate {
                dev_api_key: args.api_key,
                dev_user_id: args.user_id,
                social_provider: args.provider,
                api_base: args.base,
            };
            if update.is_empty() {
                bail!("nothing to change; pass --api-key, --user-id, --provider or --base");
            }
            update.apply(store)?;
            Output::json(DevSettings::load(store))
        }
    }
}

pub async fn login(client: &ApiClient, args: LoginArgs) -> Result<Output> {
    let url = session::start_social_login(client, args.provider).await?;
    Ok(Output::Text(url))
}

pub async fn me(client: &ApiClient, command: MeCommand) -> Result<Output> {
    match command {
        MeCommand::Show => Output::json(session::current_profile(client).await?),
        MeCommand::Update { name, email } => {
            if name.is_none() && email.is_none() {
                bail!("nothing to change; pass --name or --email");
            }
            Ok(client
                .update_me(name.as_deref(), email.as_deref())
                .await?
                .into())
        }
        MeCommand::Sync {
            access_token,
            name,
            email,
        } => {
            let mut overrides = Map::new();
            if let Some(name) = name {
                overrides.insert("name".to_string(), Value::from(name));
            }
            if let Some(email) = email {
                overrides.insert("email".to_string(), Value::from(email));
            }
            Ok(client.sync_profile(&access_token, overrides).await?.into())
        }
    }
}

pub async fn admin(client: &ApiClient, command: AdminCommand) -> Result<Output> {
    match command {
        AdminCommand::Login { token } => {
            session::admin_login(client, &token).await?;
            Ok(Output::Done("admin login ok"))
        }
        AdminCommand::Ping => Ok(client.admin_ping().await?.into()),
    }
}
