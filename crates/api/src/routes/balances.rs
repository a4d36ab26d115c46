//! Group balance routes.

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use splitledger_db::repositories::{BalanceRepository, BalanceWithUser};
use splitledger_shared::types::{GroupId, Money, UserId};
use tracing::debug;

use super::users::UserSummary;
use crate::{
    AppState,
    error::{ApiPath, ApiResult},
};

/// Creates the balance routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/groups/{group_id}/balances", get(group_balances))
}

/// Net balances of a group.
#[derive(Debug, Serialize)]
pub struct GroupBalancesResponse {
    /// Group ID.
    pub group_id: GroupId,
    /// One entry per participating user.
    pub balances: Vec<BalanceEntry>,
}

/// A user's net balance. Positive means the user is owed money.
#[derive(Debug, Serialize)]
pub struct BalanceEntry {
    /// User ID.
    pub user_id: UserId,
    /// The user, when the record still exists.
    pub user: Option<UserSummary>,
    /// Net balance.
    pub balance: Money,
}

impl From<BalanceWithUser> for BalanceEntry {
    fn from(row: BalanceWithUser) -> Self {
        Self {
            user_id: row.balance.user_id,
            user: row.user.map(UserSummary::from),
            balance: row.balance.balance,
        }
    }
}

/// GET `/groups/{group_id}/balances`
async fn group_balances(
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<GroupId>,
) -> ApiResult<impl IntoResponse> {
    let rows = BalanceRepository::new((*state.db).clone())
        .group_balances(group_id)
        .await?;
    debug!(group_id = %group_id, users = rows.len(), "Balances computed");

    Ok(Json(GroupBalancesResponse {
        group_id,
        balances: rows.into_iter().map(BalanceEntry::from).collect(),
    }))
}
