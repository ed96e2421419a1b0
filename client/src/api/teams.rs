use rabbit_types::{OrganizationId, TeamId, UserId};
use serde_json::Value;

use crate::{ApiClient, ApiError, ApiPath, Page, Query};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamQuery {
    pub q: Option<String>,
    pub organization_id: Option<OrganizationId>,
    pub page: Page,
}

impl ApiClient {
    pub async fn list_teams(&self, query: &TeamQuery) -> Result<Value, ApiError> {
        let params = Query::new()
            .with_text("q", query.q.as_deref())
            .with_opt("organization_id", query.organization_id);
        self.get_json(&ApiPath::new("/v1/teams"), &query.page.apply(params))
            .await
    }

    pub async fn get_team(&self, id: TeamId) -> Result<Value, ApiError> {
        self.get_json(&ApiPath::new("/v1/teams").push(id), &Query::new())
            .await
    }

    /// Wallet balances per currency.
    pub async fn get_wallets(&self, user_id: UserId) -> Result<Value, ApiError> {
        self.get_json(&ApiPath::new("/v1/wallets").push(user_id), &Query::new())
            .await
    }

    /// Most recent ledger entries first.
    pub async fn get_ledger(&self, user_id: UserId, limit: u32) -> Result<Value, ApiError> {
        self.get_json(
            &ApiPath::new("/v1/wallets").push(user_id).push("ledger"),
            &Query::new().with("limit", limit),
        )
        .await
    }
}
