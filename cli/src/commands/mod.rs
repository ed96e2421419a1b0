//! Subcommand tree and dispatch.

mod account;
mod billing;
mod plans;
mod relay;
mod reports;
mod settings;

use anyhow::Result;
use clap::Subcommand;

use rabbit_client::ApiClient;
use rabbit_config::StoreKey;
use rabbit_core::DEFAULT_DEV_USER_ID;
use rabbit_types::UserId;

use crate::output::Output;

#[derive(Subcommand)]
pub enum Command {
    /// Show which backend the console talks to, and ping it
    Health(account::HealthArgs),
    /// Show or change the debug-mode identity and credentials
    #[command(subcommand)]
    Dev(account::DevCommand),
    /// Start a social login and print the URL to open
    Login(account::LoginArgs),
    /// Forget the dev identity and admin token (keeps the API base)
    Logout,
    /// The signed-in user's profile
    #[command(subcommand)]
    Me(account::MeCommand),
    /// Admin session
    #[command(subcommand)]
    Admin(account::AdminCommand),
    /// Usage and spend reports
    #[command(subcommand)]
    Report(reports::ReportCommand),
    /// Billing customers
    #[command(subcommand)]
    Customer(billing::CustomerCommand),
    /// Billing subscriptions
    #[command(subcommand)]
    Subscription(billing::SubscriptionCommand),
    /// Invoices
    #[command(subcommand)]
    Invoice(billing::InvoiceCommand),
    /// Stripe synchronisation
    #[command(subcommand)]
    Stripe(billing::StripeCommand),
    /// Plan to Stripe price mappings
    #[command(subcommand)]
    PriceMapping(billing::PriceMappingCommand),
    /// Plans, limits, pricing and assignments
    #[command(subcommand)]
    Plan(plans::PlanCommand),
    /// Teams
    #[command(subcommand)]
    Team(reports::TeamCommand),
    /// Wallet balances and ledger
    #[command(subcommand)]
    Wallet(reports::WalletCommand),
    /// Admin system settings
    #[command(subcommand)]
    Settings(settings::SettingsCommand),
    /// Chat completions through the relay
    #[command(subcommand)]
    Proxy(relay::ProxyCommand),
    /// Payments and refunds
    #[command(subcommand)]
    Pay(relay::PayCommand),
    /// Generate synthetic usage on a dev backend
    Seed(relay::SeedArgs),
}

pub async fn run(client: &ApiClient, command: Command) -> Result<Output> {
    match command {
        Command::Health(args) => account::health(client, args).await,
        Command::Dev(command) => account::dev(client, command),
        Command::Login(args) => account::login(client, args).await,
        Command::Logout => {
            rabbit_core::session::logout(client.store())?;
            Ok(Output::Done("logged out"))
        }
        Command::Me(command) => account::me(client, command).await,
        Command::Admin(command) => account::admin(client, command).await,
        Command::Report(command) => reports::report(client, command).await,
        Command::Customer(command) => billing::customer(client, command).await,
        Command::Subscription(command) => billing::subscription(client, command).await,
        Command::Invoice(command) => billing::invoice(client, command).await,
        Command::Stripe(command) => billing::stripe(client, command).await,
        Command::PriceMapping(command) => billing::price_mapping(client, command).await,
        Command::Plan(command) => plans::plan(client, command).await,
        Command::Team(command) => reports::team(client, command).await,
        Command::Wallet(command) => reports::wallet(client, command).await,
        Command::Settings(command) => settings::settings(client, command).await,
        Command::Proxy(command) => relay::proxy(client, command).await,
        Command::Pay(command) => relay::pay(client, command).await,
        Command::Seed(args) => relay::seed(client, args).await,
    }
}

/// `explicit`, else the stored `dev_user_id`, else user 1.
fn user_or_dev(client: &ApiClient, explicit: Option<UserId>) -> Result<UserId> {
    if let Some(user_id) = explicit {
        return Ok(user_id);
    }
    let stored = client
        .store()
        .get_non_empty(StoreKey::DevUserId)
        .unwrap_or_else(|| DEFAULT_DEV_USER_ID.to_string());
    Ok(stored.parse()?)
}
