//! User repository for database operations.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use splitledger_shared::AppError;
use splitledger_shared::types::UserId;
use uuid::Uuid;

use crate::entities::{expense_shares, expenses, group_members, groups, users};

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// User not found.
    #[error("User not found: {0}")]
    NotFound(UserId),

    /// Email is already registered to another user.
    #[error("A user with email '{0}' already exists")]
    DuplicateEmail(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => Self::NotFound(err.to_string()),
            UserError::DuplicateEmail(_) => Self::Conflict(err.to_string()),
            UserError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Display name.
    pub name: String,
    /// Optional unique email.
    pub email: Option<String>,
    /// Optional phone number.
    pub phone: Option<String>,
}

/// Input for updating a user. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    /// Display name.
    pub name: Option<String>,
    /// Email; `Some(None)` clears it.
    pub email: Option<Option<String>>,
    /// Phone; `Some(None)` clears it.
    pub phone: Option<Option<String>>,
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists all users in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<users::Model>, UserError> {
        Ok(users::Entity::find()
            .order_by_asc(users::Column::CreatedAt)
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id.into_inner()).one(&self.db).await
    }

    /// Gets a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub async fn get(&self, id: UserId) -> Result<users::Model, UserError> {
        self.find_by_id(id).await?.ok_or(UserError::NotFound(id))
    }

    /// Checks if an email is already registered, optionally ignoring one user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn email_exists(&self, email: &str, except: Option<UserId>) -> Result<bool, DbErr> {
        let mut query = users::Entity::find().filter(users::Column::Email.eq(email));
        if let Some(id) = except {
            query = query.filter(users::Column::Id.ne(id.into_inner()));
        }

        Ok(query.count(&self.db).await? > 0)
    }

    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateEmail` if the email is taken.
    pub async fn create(&self, input: CreateUserInput) -> Result<users::Model, UserError> {
        if let Some(email) = &input.email {
            if self.email_exists(email, None).await? {
                return Err(UserError::DuplicateEmail(email.clone()));
            }
        }

        let user = users::ActiveModel {
            id: Set(UserId::new().into_inner()),
            name: Set(input.name),
            email: Set(input.email),
            phone: Set(input.phone),
            created_at: Set(chrono::Utc::now().into()),
        };

        Ok(user.insert(&self.db).await?)
    }

    /// Updates a user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist or `DuplicateEmail` if
    /// the new email belongs to someone else.
    pub async fn update(
        &self,
        id: UserId,
        input: UpdateUserInput,
    ) -> Result<users::Model, UserError> {
        let user = self.get(id).await?;

        if let Some(Some(email)) = &input.email {
            if self.email_exists(email, Some(id)).await? {
                return Err(UserError::DuplicateEmail(email.clone()));
            }
        }

        let mut active = user.into_active_model();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(email) = input.email {
            active.email = Set(email);
        }
        if let Some(phone) = input.phone {
            active.phone = Set(phone);
        }

        Ok(active.update(&self.db).await?)
    }

    /// Deletes a user.
    ///
    /// In one transaction the user's memberships and shares are removed, and
    /// expenses they paid and groups they created lose that reference.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub async fn delete(&self, id: UserId) -> Result<(), UserError> {
        let user_id: Uuid = id.into_inner();
        let txn = self.db.begin().await?;

        if users::Entity::find_by_id(user_id).one(&txn).await?.is_none() {
            return Err(UserError::NotFound(id));
        }

        expense_shares::Entity::delete_many()
            .filter(expense_shares::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        group_members::Entity::delete_many()
            .filter(group_members::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        expenses::Entity::update_many()
            .col_expr(
                expenses::Column::PaidByUserId,
                Expr::value(Option::<Uuid>::None),
            )
            .filter(expenses::Column::PaidByUserId.eq(user_id))
            .exec(&txn)
            .await?;

        groups::Entity::update_many()
            .col_expr(
                groups::Column::CreatedByUserId,
                Expr::value(Option::<Uuid>::None),
            )
            .filter(groups::Column::CreatedByUserId.eq(user_id))
            .exec(&txn)
            .await?;

        users::Entity::delete_by_id(user_id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }
}
