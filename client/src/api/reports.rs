use rabbit_types::{GroupBy, ReportDate, ReportFormat, TeamId, UserId};
use serde_json::Value;

use crate::{ApiClient, ApiError, ApiPath, Query, ReportOutput};

/// Filters shared by the period reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodQuery {
    pub user_id: UserId,
    pub date_from: ReportDate,
    pub date_to: ReportDate,
    pub model: Option<String>,
    pub success: Option<bool>,
    pub group_by: GroupBy,
    pub format: ReportFormat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamPeriodQuery {
    pub team_id: TeamId,
    pub date_from: ReportDate,
    pub date_to: ReportDate,
    pub model: Option<String>,
    pub success: Option<bool>,
    pub group_by: GroupBy,
    pub format: ReportFormat,
}

fn period_filters(
    query: Query,
    date_from: ReportDate,
    date_to: ReportDate,
    model: Option<&str>,
    success: Option<bool>,
    group_by: GroupBy,
    format: ReportFormat,
) -> Query {
    query
        .with("date_from", date_from)
        .with("date_to", date_to)
        .with_text("model", model)
        .with_opt("success", success)
        .with("group_by", group_by)
        .with("format", format)
}

impl ApiClient {
    /// `GET /v1/reports/daily`.
    pub async fn daily_report(&self, user_id: UserId, date: ReportDate) -> Result<Value, ApiError> {
        self.get_json(
            &ApiPath::new("/v1/reports/daily"),
            &Query::new().with("user_id", user_id).with("date", date),
        )
        .await
    }

    /// `GET /v1/reports/budget`.
    pub async fn budget_report(
        &self,
        user_id: UserId,
        format: ReportFormat,
    ) -> Result<ReportOutput, ApiError> {
        self.get_report(
            &ApiPath::new("/v1/reports/budget"),
            &Query::new().with("user_id", user_id).with("format", format),
            format,
        )
        .await
    }

    /// `GET /v1/reports/summary`.
    pub async fn summary_report(&self, user_id: UserId, days: u32) -> Result<Value, ApiError> {
        self.get_json(
            &ApiPath::new("/v1/reports/summary"),
            &Query::new().with("user_id", user_id).with("days", days),
        )
        .await
    }

    /// `GET /v1/reports/overdraft`.
    pub async fn overdraft_report(&self, user_id: UserId, days: u32) -> Result<Value, ApiError> {
        self.get_json(
            &ApiPath::new("/v1/reports/overdraft"),
            &Query::new().with("user_id", user_id).with("days", days),
        )
        .await
    }

    /// `GET /v1/reports/period`. CSV output is returned as raw text.
    pub async fn period_report(&self, query: &PeriodQuery) -> Result<ReportOutput, ApiError> {
        let params = period_filters(
            Query::new().with("user_id", query.user_id),
            query.date_from,
            query.date_to,
            query.model.as_deref(),
            query.success,
            query.group_by,
            query.format,
        );
        self.get_report(&ApiPath::new("/v1/reports/period"), &params, query.format)
            .await
    }

    /// `GET /v1/reports/period_team`. CSV output is returned as raw text.
    pub async fn team_period_report(
        &self,
        query: &TeamPeriodQuery,
    ) -> Result<ReportOutput, ApiError> {
        let params = period_filters(
            Query::new().with("team_id", query.team_id),
            query.date_from,
            query.date_to,
            query.model.as_deref(),
            query.success,
            query.group_by,
            query.format,
        );
        self.get_report(
            &ApiPath::new("/v1/reports/period_team"),
            &params,
            query.format,
        )
        .await
    }
}
