//! Balance repository: loads a group's ledger and aggregates it.

use std::collections::HashMap;

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};
use splitledger_core::balance::{ExpenseLedger, ShareLedger, UserBalance, compute_balances};
use splitledger_shared::AppError;
use splitledger_shared::types::{GroupId, Money, UserId};
use uuid::Uuid;

use crate::entities::{expense_shares, expenses, groups, users};

/// Error types for balance queries.
#[derive(Debug, thiserror::Error)]
pub enum BalanceError {
    /// Group not found.
    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<BalanceError> for AppError {
    fn from(err: BalanceError) -> Self {
        match err {
            BalanceError::GroupNotFound(_) => Self::NotFound(err.to_string()),
            BalanceError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// A user's balance with the user record attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceWithUser {
    /// The user, if still present.
    pub user: Option<users::Model>,
    /// The computed balance.
    pub balance: UserBalance,
}

/// Balance repository.
#[derive(Debug, Clone)]
pub struct BalanceRepository {
    db: DatabaseConnection,
}

impl BalanceRepository {
    /// Creates a new balance repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Computes net balances for a group.
    ///
    /// Expenses are visited in creation order, so users are reported in the
    /// order they first appear there.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound` if the group does not exist.
    pub async fn group_balances(
        &self,
        group_id: GroupId,
    ) -> Result<Vec<BalanceWithUser>, BalanceError> {
        let exists = groups::Entity::find_by_id(group_id.into_inner())
            .one(&self.db)
            .await?
            .is_some();
        if !exists {
            return Err(BalanceError::GroupNotFound(group_id));
        }

        let rows = expenses::Entity::find()
            .filter(expenses::Column::GroupId.eq(group_id.into_inner()))
            .order_by_asc(expenses::Column::CreatedAt)
            .order_by_asc(expenses::Column::Id)
            .find_with_related(expense_shares::Entity)
            .order_by_asc(expense_shares::Column::Id)
            .all(&self.db)
            .await?;

        let ledger: Vec<ExpenseLedger> = rows
            .into_iter()
            .map(|(expense, shares)| ExpenseLedger {
                paid_by: expense.paid_by_user_id.map(UserId::from_uuid),
                amount: Money::from_minor_units(expense.amount_minor),
                shares: shares
                    .into_iter()
                    .map(|s| ShareLedger {
                        user_id: UserId::from_uuid(s.user_id),
                        amount: Money::from_minor_units(s.amount_minor),
                        is_settled: s.is_settled,
                    })
                    .collect(),
            })
            .collect();

        let balances = compute_balances(&ledger);

        let user_ids: Vec<Uuid> = balances.iter().map(|b| b.user_id.into_inner()).collect();
        let mut users_by_id: HashMap<Uuid, users::Model> = if user_ids.is_empty() {
            HashMap::new()
        } else {
            users::Entity::find()
                .filter(users::Column::Id.is_in(user_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|u| (u.id, u))
                .collect()
        };

        Ok(balances
            .into_iter()
            .map(|balance| BalanceWithUser {
                user: users_by_id.remove(&balance.user_id.into_inner()),
                balance,
            })
            .collect())
    }
}
