//! Group repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use splitledger_shared::AppError;
use splitledger_shared::types::{GroupId, UserId};
use uuid::Uuid;

use crate::entities::{expense_shares, expenses, group_members, groups, users};

/// Error types for group operations.
#[derive(Debug, thiserror::Error)]
pub enum GroupError {
    /// Group not found.
    #[error("Group not found: {0}")]
    NotFound(GroupId),

    /// Referenced creator does not exist.
    #[error("created_by_user_id {0} does not exist")]
    CreatorNotFound(UserId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<GroupError> for AppError {
    fn from(err: GroupError) -> Self {
        match err {
            GroupError::NotFound(_) => Self::NotFound(err.to_string()),
            GroupError::CreatorNotFound(_) => Self::Validation(err.to_string()),
            GroupError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Group repository.
#[derive(Debug, Clone)]
pub struct GroupRepository {
    db: DatabaseConnection,
}

impl GroupRepository {
    /// Creates a new group repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists all groups, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<groups::Model>, GroupError> {
        Ok(groups::Entity::find()
            .order_by_desc(groups::Column::CreatedAt)
            .order_by_desc(groups::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Gets a group by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the group does not exist.
    pub async fn get(&self, id: GroupId) -> Result<groups::Model, GroupError> {
        groups::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(GroupError::NotFound(id))
    }

    /// Creates a new group.
    ///
    /// # Errors
    ///
    /// Returns `CreatorNotFound` if `created_by` does not exist.
    pub async fn create(
        &self,
        name: String,
        created_by: Option<UserId>,
    ) -> Result<groups::Model, GroupError> {
        if let Some(creator) = created_by {
            let exists = users::Entity::find_by_id(creator.into_inner())
                .one(&self.db)
                .await?
                .is_some();
            if !exists {
                return Err(GroupError::CreatorNotFound(creator));
            }
        }

        let group = groups::ActiveModel {
            id: Set(GroupId::new().into_inner()),
            name: Set(name),
            created_by_user_id: Set(created_by.map(UserId::into_inner)),
            created_at: Set(chrono::Utc::now().into()),
        };

        Ok(group.insert(&self.db).await?)
    }

    /// Renames a group.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the group does not exist.
    pub async fn rename(&self, id: GroupId, name: String) -> Result<groups::Model, GroupError> {
        let mut active = self.get(id).await?.into_active_model();
        active.name = Set(name);
        Ok(active.update(&self.db).await?)
    }

    /// Deletes a group with its expenses, shares and memberships.
    ///
    /// Returns the receipt filenames of the deleted expenses so the caller
    /// can remove the files once the transaction has committed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the group does not exist.
    pub async fn delete(&self, id: GroupId) -> Result<Vec<String>, GroupError> {
        let group_id: Uuid = id.into_inner();
        let txn = self.db.begin().await?;

        if groups::Entity::find_by_id(group_id).one(&txn).await?.is_none() {
            return Err(GroupError::NotFound(id));
        }

        let doomed: Vec<(Uuid, Option<String>)> = expenses::Entity::find()
            .select_only()
            .column(expenses::Column::Id)
            .column(expenses::Column::ReceiptFilename)
            .filter(expenses::Column::GroupId.eq(group_id))
            .into_tuple()
            .all(&txn)
            .await?;

        let expense_ids: Vec<Uuid> = doomed.iter().map(|(id, _)| *id).collect();
        let receipts: Vec<String> = doomed.into_iter().filter_map(|(_, f)| f).collect();

        if !expense_ids.is_empty() {
            expense_shares::Entity::delete_many()
                .filter(expense_shares::Column::ExpenseId.is_in(expense_ids))
                .exec(&txn)
                .await?;
        }

        expenses::Entity::delete_many()
            .filter(expenses::Column::GroupId.eq(group_id))
            .exec(&txn)
            .await?;

        group_members::Entity::delete_many()
            .filter(group_members::Column::GroupId.eq(group_id))
            .exec(&txn)
            .await?;

        groups::Entity::delete_by_id(group_id).exec(&txn).await?;

        txn.commit().await?;
        Ok(receipts)
    }
}
