//! Expense and settlement routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use splitledger_core::split::ShareInput;
use splitledger_db::{
    entities::expense_shares,
    repositories::{CreateExpenseInput, ExpenseRepository, ExpenseWithShares, UpdateExpenseInput},
};
use splitledger_shared::types::{ExpenseId, GroupId, Money, ShareId, UserId};
use tracing::info;
use uuid::Uuid;

use super::{double_option, trimmed};
use crate::{
    AppState,
    error::{ApiJson, ApiPath, ApiResult},
};

/// Maximum description length.
const MAX_DESCRIPTION_LEN: usize = 255;

/// Creates the expense routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/groups/{group_id}/expenses",
            get(list_expenses).post(create_expense),
        )
        .route(
            "/expenses/{expense_id}",
            get(get_expense).patch(update_expense).delete(delete_expense),
        )
        .route(
            "/expenses/{expense_id}/shares/{share_id}/settle",
            post(settle_share),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating an expense.
#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    /// What the money was spent on.
    pub description: String,
    /// Total amount; quantized to cents on arrival.
    pub amount: Money,
    /// Paying member.
    #[serde(default)]
    pub paid_by_user_id: Option<UserId>,
    /// Defaults to now.
    #[serde(default)]
    pub expense_date: Option<DateTime<Utc>>,
    /// Explicit shares; omitted means an equal split.
    #[serde(default)]
    pub shares: Option<Vec<ShareInput>>,
}

/// Request body for updating an expense. Every field is optional.
#[derive(Debug, Deserialize)]
pub struct UpdateExpenseRequest {
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New total amount.
    #[serde(default)]
    pub amount: Option<Money>,
    /// Payer; `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub paid_by_user_id: Option<Option<UserId>>,
    /// New expense date.
    #[serde(default)]
    pub expense_date: Option<DateTime<Utc>>,
    /// Replacement shares.
    #[serde(default)]
    pub shares: Option<Vec<ShareInput>>,
}

/// Share representation.
#[derive(Debug, Serialize)]
pub struct ShareResponse {
    /// Share ID.
    pub id: Uuid,
    /// Owing user.
    pub user_id: Uuid,
    /// Owed amount.
    pub amount: Money,
    /// Whether the share has been paid back.
    pub is_settled: bool,
}

impl From<expense_shares::Model> for ShareResponse {
    fn from(share: expense_shares::Model) -> Self {
        Self {
            id: share.id,
            user_id: share.user_id,
            amount: Money::from_minor_units(share.amount_minor),
            is_settled: share.is_settled,
        }
    }
}

/// Full expense representation.
#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    /// Expense ID.
    pub id: Uuid,
    /// Owning group.
    pub group_id: Uuid,
    /// Payer, if any.
    pub paid_by_user_id: Option<Uuid>,
    /// Description.
    pub description: String,
    /// Total amount.
    pub amount: Money,
    /// When the expense happened.
    pub expense_date: DateTimeWithTimeZone,
    /// Stored receipt filename.
    pub receipt_filename: Option<String>,
    /// Stored receipt MIME type.
    pub receipt_mime_type: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
    /// Shares in insertion order.
    pub shares: Vec<ShareResponse>,
}

impl From<ExpenseWithShares> for ExpenseResponse {
    fn from(row: ExpenseWithShares) -> Self {
        let expense = row.expense;
        Self {
            id: expense.id,
            group_id: expense.group_id,
            paid_by_user_id: expense.paid_by_user_id,
            description: expense.description,
            amount: Money::from_minor_units(expense.amount_minor),
            expense_date: expense.expense_date,
            receipt_filename: expense.receipt_filename,
            receipt_mime_type: expense.receipt_mime_type,
            created_at: expense.created_at,
            updated_at: expense.updated_at,
            shares: row.shares.into_iter().map(ShareResponse::from).collect(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/groups/{group_id}/expenses`
async fn list_expenses(
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<GroupId>,
) -> ApiResult<impl IntoResponse> {
    let expenses = ExpenseRepository::new((*state.db).clone())
        .list_by_group(group_id)
        .await?;
    let body: Vec<ExpenseResponse> = expenses.into_iter().map(ExpenseResponse::from).collect();
    Ok(Json(body))
}

/// POST `/groups/{group_id}/expenses`
async fn create_expense(
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<GroupId>,
    ApiJson(payload): ApiJson<CreateExpenseRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = CreateExpenseInput {
        description: trimmed(&payload.description, "description", MAX_DESCRIPTION_LEN)?,
        amount: payload.amount,
        paid_by: payload.paid_by_user_id,
        expense_date: payload.expense_date,
        shares: payload.shares,
    };

    let expense = ExpenseRepository::new((*state.db).clone())
        .create(group_id, input)
        .await?;
    info!(
        group_id = %group_id,
        expense_id = %expense.expense.id,
        amount = %Money::from_minor_units(expense.expense.amount_minor),
        shares = expense.shares.len(),
        "Expense created"
    );

    Ok((StatusCode::CREATED, Json(ExpenseResponse::from(expense))))
}

/// GET `/expenses/{expense_id}`
async fn get_expense(
    State(state): State<AppState>,
    ApiPath(expense_id): ApiPath<ExpenseId>,
) -> ApiResult<impl IntoResponse> {
    let expense = ExpenseRepository::new((*state.db).clone())
        .get(expense_id)
        .await?;
    Ok(Json(ExpenseResponse::from(expense)))
}

/// PATCH `/expenses/{expense_id}`
async fn update_expense(
    State(state): State<AppState>,
    ApiPath(expense_id): ApiPath<ExpenseId>,
    ApiJson(payload): ApiJson<UpdateExpenseRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = UpdateExpenseInput {
        description: payload
            .description
            .as_deref()
            .map(|d| trimmed(d, "description", MAX_DESCRIPTION_LEN))
            .transpose()?,
        amount: payload.amount,
        paid_by: payload.paid_by_user_id,
        expense_date: payload.expense_date,
        shares: payload.shares,
    };

    let expense = ExpenseRepository::new((*state.db).clone())
        .update(expense_id, input)
        .await?;
    info!(expense_id = %expense_id, "Expense updated");

    Ok(Json(ExpenseResponse::from(expense)))
}

/// DELETE `/expenses/{expense_id}`
async fn delete_expense(
    State(state): State<AppState>,
    ApiPath(expense_id): ApiPath<ExpenseId>,
) -> ApiResult<impl IntoResponse> {
    let receipt = ExpenseRepository::new((*state.db).clone())
        .delete(expense_id)
        .await?;
    info!(expense_id = %expense_id, "Expense deleted");

    if let (Some(storage), Some(name)) = (&state.storage, receipt) {
        storage.remove_best_effort(&name).await;
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST `/expenses/{expense_id}/shares/{share_id}/settle`
async fn settle_share(
    State(state): State<AppState>,
    ApiPath((expense_id, share_id)): ApiPath<(ExpenseId, ShareId)>,
) -> ApiResult<impl IntoResponse> {
    let share = ExpenseRepository::new((*state.db).clone())
        .settle_share(expense_id, share_id)
        .await?;
    info!(expense_id = %expense_id, share_id = %share_id, "Share settled");

    Ok(Json(ShareResponse::from(share)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_create_request_quantizes_amount() {
        let request: CreateExpenseRequest =
            serde_json::from_str(r#"{"description": "Dinner", "amount": "10.005"}"#).unwrap();

        assert_eq!(request.amount, Money::from_decimal(dec!(10.00)));
        assert!(request.shares.is_none());
    }

    #[test]
    fn test_update_request_null_payer() {
        let request: UpdateExpenseRequest =
            serde_json::from_str(r#"{"paid_by_user_id": null}"#).unwrap();

        assert_eq!(request.paid_by_user_id, Some(None));
        assert!(request.amount.is_none());
    }

    #[test]
    fn test_share_response_amount_from_cents() {
        let share = expense_shares::Model {
            id: Uuid::nil(),
            expense_id: Uuid::nil(),
            user_id: Uuid::nil(),
            amount_minor: 3334,
            is_settled: false,
        };

        let json = serde_json::to_value(ShareResponse::from(share)).unwrap();
        assert_eq!(json["amount"], "33.34");
    }
}
