use anyhow::Result;
use clap::{Args, Subcommand};

use rabbit_client::{ApiClient, Page, PeriodQuery, TeamPeriodQuery, TeamQuery};
use rabbit_types::{GroupBy, OrganizationId, ReportDate, ReportFormat, TeamId, UserId};

use super::user_or_dev;
use crate::output::Output;

#[derive(Subcommand)]
pub enum ReportCommand {
    /// Usage for one day
    Daily {
        #[arg(long)]
        user_id: Option<UserId>,
        /// Defaults to today
        #[arg(long)]
        date: Option<ReportDate>,
    },
    /// Budget consumption against the plan limit
    Budget {
        #[arg(long)]
        user_id: Option<UserId>,
        #[arg(long, default_value_t)]
        format: ReportFormat,
    },
    /// Spend over the last N days
    Summary {
        #[arg(long)]
        user_id: Option<UserId>,
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
    /// Overdraft events over the last N days
    Overdraft {
        #[arg(long)]
        user_id: Option<UserId>,
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
    /// Usage over a date range for one user
    Period {
        #[arg(long)]
        user_id: Option<UserId>,
        #[command(flatten)]
        filters: PeriodFilters,
    },
    /// Usage over a date range for a whole team
    TeamPeriod {
        #[arg(long)]
        team_id: TeamId,
        #[command(flatten)]
        filters: PeriodFilters,
    },
}

#[derive(Args)]
pub struct PeriodFilters {
    /// Defaults to six days before --to
    #[arg(long = "from")]
    date_from: Option<ReportDate>,
    /// Defaults to today
    #[arg(long = "to")]
    date_to: Option<ReportDate>,
    #[arg(long)]
    model: Option<String>,
    /// Only successful (true) or failed (false) requests
    #[arg(long)]
    success: Option<bool>,
    #[arg(long, default_value_t)]
    group_by: GroupBy,
    #[arg(long, default_value_t)]
    format: ReportFormat,
}

impl PeriodFilters {
    fn range(&self) -> (ReportDate, ReportDate) {
        let to = self.date_to.unwrap_or_else(ReportDate::today);
        let from = self.date_from.unwrap_or_else(|| to.days_before(6));
        (from, to)
    }
}

#[derive(Subcommand)]
pub enum TeamCommand {
    List {
        #[arg(long)]
        q: Option<String>,
        #[arg(long)]
        organization_id: Option<OrganizationId>,
        #[arg(long, default_value_t = 50)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    Get { id: TeamId },
}

#[derive(Subcommand)]
pub enum WalletCommand {
    /// Balances per currency
    Show {
        #[arg(long)]
        user_id: Option<UserId>,
    },
    /// Most recent ledger entries
    Ledger {
        #[arg(long)]
        user_id: Option<UserId>,
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
}

pub async fn report(client: &ApiClient, command: ReportCommand) -> Result<Output> {
    let output: Output = match command {
        ReportCommand::Daily { user_id, date } => client
            .daily_report(
                user_or_dev(client, user_id)?,
                date.unwrap_or_else(ReportDate::today),
            )
            .await?
            .into(),
        ReportCommand::Budget { user_id, format } => client
            .budget_report(user_or_dev(client, user_id)?, format)
            .await?
            .into(),
        ReportCommand::Summary { user_id, days } => client
            .summary_report(user_or_dev(client, user_id)?, days)
            .await?
            .into(),
        ReportCommand::Overdraft { user_id, days } => client
            .overdraft_report(user_or_dev(client, user_id)?, days)
            .await?
            .into(),
        ReportCommand::Period { user_id, filters } => {
            let (date_from, date_to) = filters.range();
            let query = PeriodQuery {
                user_id: user_or_dev(client, user_id)?,
                date_from,
                date_to,
                model: filters.model,
                success: filters.success,
                group_by: filters.group_by,
                format: filters.format,
            };
            client.period_report(&query).await?.into()
        }
        ReportCommand::TeamPeriod { team_id, filters } => {
            let (date_from, date_to) = filters.range();
            let query = TeamPeriodQuery {
                team_id,
                date_from,
                date_to,
                model: filters.model,
                success: filters.success,
                group_by: filters.group_by,
                format: filters.format,
            };
            client.team_period_report(&query).await?.into()
        }
    };
    Ok(output)
}

pub async fn team(client: &ApiClient, command: TeamCommand) -> Result<Output> {
    let value = match command {
        TeamCommand::List {
            q,
            organization_id,
            limit,
            offset,
        } => {
            client
                .list_teams(&TeamQuery {
                    q,
                    organization_id,
                    page: Page::new(limit, offset),
                })
                .await?
        }
        TeamCommand::Get { id } => client.get_team(id).await?,
    };
    Ok(value.into())
}

pub async fn wallet(client: &ApiClient, command: WalletCommand) -> Result<Output> {
    let value = match command {
        WalletCommand::Show { user_id } => {
            client.get_wallets(user_or_dev(client, user_id)?).await?
        }
        WalletCommand::Ledger { user_id, limit } => {
            client
                .get_ledger(user_or_dev(client, user_id)?, limit)
                .await?
        }
    };
    Ok(value.into())
}
