//! Expense repository for database operations.
//!
//! Expense writes and the replacement of their shares happen in one
//! transaction: if share reconciliation fails, nothing is persisted.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use splitledger_core::split::{
    Allocation, ReconcileMode, ShareInput, SplitError, reconcile, validate_expense_amount,
};
use splitledger_shared::AppError;
use splitledger_shared::types::{ExpenseId, GroupId, Money, ShareId, UserId};
use uuid::Uuid;

use super::membership::member_user_ids;
use crate::entities::{expense_shares, expenses, groups};

/// Error types for expense operations.
#[derive(Debug, thiserror::Error)]
pub enum ExpenseError {
    /// Group not found.
    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),

    /// Expense not found.
    #[error("Expense not found: {0}")]
    NotFound(ExpenseId),

    /// Share not found on the given expense.
    #[error("Expense share not found: {0}")]
    ShareNotFound(ShareId),

    /// Payer is not a member of the expense's group.
    #[error("paid_by_user_id must be a member of the group")]
    PayerNotMember(UserId),

    /// Share allocation or validation failed.
    #[error(transparent)]
    Split(#[from] SplitError),

    /// Amount does not fit the storage column.
    #[error("Amount out of range: {0}")]
    AmountOutOfRange(Money),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ExpenseError> for AppError {
    fn from(err: ExpenseError) -> Self {
        match err {
            ExpenseError::GroupNotFound(_)
            | ExpenseError::NotFound(_)
            | ExpenseError::ShareNotFound(_) => Self::NotFound(err.to_string()),
            ExpenseError::PayerNotMember(_)
            | ExpenseError::Split(_)
            | ExpenseError::AmountOutOfRange(_) => Self::Validation(err.to_string()),
            ExpenseError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// An expense together with its shares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseWithShares {
    /// The expense record.
    pub expense: expenses::Model,
    /// Its shares, in insertion order.
    pub shares: Vec<expense_shares::Model>,
}

/// Input for creating an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    /// Trimmed description.
    pub description: String,
    /// Quantized amount.
    pub amount: Money,
    /// Payer, if any.
    pub paid_by: Option<UserId>,
    /// Expense date; defaults to now.
    pub expense_date: Option<DateTime<Utc>>,
    /// Explicit shares; `None` splits equally across the group.
    pub shares: Option<Vec<ShareInput>>,
}

/// Input for updating an expense. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateExpenseInput {
    /// Trimmed description.
    pub description: Option<String>,
    /// New amount; without `shares` this re-splits equally.
    pub amount: Option<Money>,
    /// Payer; `Some(None)` clears it.
    pub paid_by: Option<Option<UserId>>,
    /// Expense date.
    pub expense_date: Option<DateTime<Utc>>,
    /// Replacement shares.
    pub shares: Option<Vec<ShareInput>>,
}

/// Expense repository.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists a group's expenses, most recent `expense_date` first.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound` if the group does not exist.
    pub async fn list_by_group(
        &self,
        group_id: GroupId,
    ) -> Result<Vec<ExpenseWithShares>, ExpenseError> {
        ensure_group(&self.db, group_id).await?;

        let expenses = expenses::Entity::find()
            .filter(expenses::Column::GroupId.eq(group_id.into_inner()))
            .order_by_desc(expenses::Column::ExpenseDate)
            .order_by_desc(expenses::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let ids: Vec<Uuid> = expenses.iter().map(|e| e.id).collect();
        let mut by_expense = shares_by_expense(&self.db, ids).await?;

        Ok(expenses
            .into_iter()
            .map(|expense| ExpenseWithShares {
                shares: by_expense.remove(&expense.id).unwrap_or_default(),
                expense,
            })
            .collect())
    }

    /// Gets an expense with its shares.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the expense does not exist.
    pub async fn get(&self, id: ExpenseId) -> Result<ExpenseWithShares, ExpenseError> {
        load(&self.db, id).await
    }

    /// Creates an expense and its shares.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound`, `PayerNotMember` or a `Split` validation
    /// error; nothing is written in that case.
    pub async fn create(
        &self,
        group_id: GroupId,
        input: CreateExpenseInput,
    ) -> Result<ExpenseWithShares, ExpenseError> {
        let txn = self.db.begin().await?;

        ensure_group(&txn, group_id).await?;
        validate_expense_amount(input.amount)?;

        let members = member_user_ids(&txn, group_id.into_inner()).await?;
        if let Some(payer) = input.paid_by {
            ensure_member(&members, payer)?;
        }

        let allocations = reconcile(
            input.amount,
            &members,
            input.shares.as_deref(),
            ReconcileMode::Create,
        )?;

        let now = Utc::now();
        let expense = expenses::ActiveModel {
            id: Set(ExpenseId::new().into_inner()),
            group_id: Set(group_id.into_inner()),
            paid_by_user_id: Set(input.paid_by.map(UserId::into_inner)),
            description: Set(input.description),
            amount_minor: Set(minor_units(input.amount)?),
            expense_date: Set(input.expense_date.unwrap_or(now).into()),
            receipt_filename: Set(None),
            receipt_mime_type: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        let shares = replace_shares(&txn, expense.id, &allocations).await?;

        txn.commit().await?;
        Ok(ExpenseWithShares { expense, shares })
    }

    /// Updates an expense.
    ///
    /// Supplying `shares` replaces the share set. Supplying only `amount`
    /// re-splits it equally across the current members, which resets every
    /// settlement flag.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `PayerNotMember` or a `Split` validation error;
    /// nothing is written in that case.
    pub async fn update(
        &self,
        id: ExpenseId,
        input: UpdateExpenseInput,
    ) -> Result<ExpenseWithShares, ExpenseError> {
        let txn = self.db.begin().await?;

        let current = expenses::Entity::find_by_id(id.into_inner())
            .one(&txn)
            .await?
            .ok_or(ExpenseError::NotFound(id))?;
        let members = member_user_ids(&txn, current.group_id).await?;

        if let Some(Some(payer)) = input.paid_by {
            ensure_member(&members, payer)?;
        }
        if let Some(amount) = input.amount {
            validate_expense_amount(amount)?;
        }

        let amount = match input.amount {
            Some(amount) => amount,
            None => Money::from_minor_units(current.amount_minor),
        };
        let resplit = input.shares.is_some() || input.amount.is_some();
        let allocations = if resplit {
            Some(reconcile(
                amount,
                &members,
                input.shares.as_deref(),
                ReconcileMode::Update,
            )?)
        } else {
            None
        };

        let expense_id = current.id;
        let mut active = current.into_active_model();
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(paid_by) = input.paid_by {
            active.paid_by_user_id = Set(paid_by.map(UserId::into_inner));
        }
        if let Some(date) = input.expense_date {
            active.expense_date = Set(date.into());
        }
        active.amount_minor = Set(minor_units(amount)?);
        active.updated_at = Set(Utc::now().into());
        let expense = active.update(&txn).await?;

        let shares = match allocations {
            Some(allocations) => replace_shares(&txn, expense_id, &allocations).await?,
            None => shares_of(&txn, expense_id).await?,
        };

        txn.commit().await?;
        Ok(ExpenseWithShares { expense, shares })
    }

    /// Deletes an expense and its shares.
    ///
    /// Returns the receipt filename, if any, for removal after commit.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the expense does not exist.
    pub async fn delete(&self, id: ExpenseId) -> Result<Option<String>, ExpenseError> {
        let txn = self.db.begin().await?;

        let expense = expenses::Entity::find_by_id(id.into_inner())
            .one(&txn)
            .await?
            .ok_or(ExpenseError::NotFound(id))?;

        expense_shares::Entity::delete_many()
            .filter(expense_shares::Column::ExpenseId.eq(expense.id))
            .exec(&txn)
            .await?;
        expenses::Entity::delete_by_id(expense.id).exec(&txn).await?;

        txn.commit().await?;
        Ok(expense.receipt_filename)
    }

    /// Marks a share as settled. Settling twice is not an error.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing expense and `ShareNotFound` when the
    /// share does not belong to it.
    pub async fn settle_share(
        &self,
        expense_id: ExpenseId,
        share_id: ShareId,
    ) -> Result<expense_shares::Model, ExpenseError> {
        let exists = expenses::Entity::find_by_id(expense_id.into_inner())
            .one(&self.db)
            .await?
            .is_some();
        if !exists {
            return Err(ExpenseError::NotFound(expense_id));
        }

        let share = expense_shares::Entity::find_by_id(share_id.into_inner())
            .filter(expense_shares::Column::ExpenseId.eq(expense_id.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(ExpenseError::ShareNotFound(share_id))?;

        if share.is_settled {
            return Ok(share);
        }

        let mut active = share.into_active_model();
        active.is_settled = Set(true);
        Ok(active.update(&self.db).await?)
    }
}

pub(crate) async fn load<C>(conn: &C, id: ExpenseId) -> Result<ExpenseWithShares, ExpenseError>
where
    C: ConnectionTrait,
{
    let expense = expenses::Entity::find_by_id(id.into_inner())
        .one(conn)
        .await?
        .ok_or(ExpenseError::NotFound(id))?;
    let shares = shares_of(conn, expense.id).await?;
    Ok(ExpenseWithShares { expense, shares })
}

async fn ensure_group<C>(conn: &C, group_id: GroupId) -> Result<(), ExpenseError>
where
    C: ConnectionTrait,
{
    groups::Entity::find_by_id(group_id.into_inner())
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or(ExpenseError::GroupNotFound(group_id))
}

fn ensure_member(members: &[UserId], user_id: UserId) -> Result<(), ExpenseError> {
    if members.contains(&user_id) {
        Ok(())
    } else {
        Err(ExpenseError::PayerNotMember(user_id))
    }
}

fn minor_units(amount: Money) -> Result<i64, ExpenseError> {
    amount
        .to_minor_units()
        .ok_or(ExpenseError::AmountOutOfRange(amount))
}

async fn shares_of<C>(conn: &C, expense_id: Uuid) -> Result<Vec<expense_shares::Model>, DbErr>
where
    C: ConnectionTrait,
{
    let mut by_expense = shares_by_expense(conn, vec![expense_id]).await?;
    Ok(by_expense.remove(&expense_id).unwrap_or_default())
}

async fn shares_by_expense<C>(
    conn: &C,
    expense_ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, Vec<expense_shares::Model>>, DbErr>
where
    C: ConnectionTrait,
{
    let mut grouped: HashMap<Uuid, Vec<expense_shares::Model>> = HashMap::new();
    if expense_ids.is_empty() {
        return Ok(grouped);
    }

    let shares = expense_shares::Entity::find()
        .filter(expense_shares::Column::ExpenseId.is_in(expense_ids))
        .order_by_asc(expense_shares::Column::Id)
        .all(conn)
        .await?;

    for share in shares {
        grouped.entry(share.expense_id).or_default().push(share);
    }
    Ok(grouped)
}

/// Deletes every share of an expense and inserts `allocations` unsettled.
async fn replace_shares<C>(
    conn: &C,
    expense_id: Uuid,
    allocations: &[Allocation],
) -> Result<Vec<expense_shares::Model>, ExpenseError>
where
    C: ConnectionTrait,
{
    expense_shares::Entity::delete_many()
        .filter(expense_shares::Column::ExpenseId.eq(expense_id))
        .exec(conn)
        .await?;

    let mut shares = Vec::with_capacity(allocations.len());
    for allocation in allocations {
        let share = expense_shares::ActiveModel {
            id: Set(ShareId::new().into_inner()),
            expense_id: Set(expense_id),
            user_id: Set(allocation.user_id.into_inner()),
            amount_minor: Set(minor_units(allocation.amount)?),
            is_settled: Set(false),
        }
        .insert(conn)
        .await?;
        shares.push(share);
    }
    Ok(shares)
}
