//! Membership repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};
use splitledger_shared::AppError;
use splitledger_shared::types::{GroupId, MembershipId, UserId};
use uuid::Uuid;

use crate::entities::{group_members, groups, users};

/// Error types for membership operations.
#[derive(Debug, thiserror::Error)]
pub enum MembershipError {
    /// Group not found.
    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),

    /// User to add does not exist.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// User already belongs to the group.
    #[error("User {user_id} is already a member of group {group_id}")]
    AlreadyMember {
        /// The group.
        group_id: GroupId,
        /// The user.
        user_id: UserId,
    },

    /// Membership not found within the group.
    #[error("Group member not found: {0}")]
    NotFound(MembershipId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl MembershipError {
    /// Maps a failed membership insert.
    ///
    /// A concurrent add of the same user passes the existence check and then
    /// hits the `(group_id, user_id)` unique index; that is a conflict, not a
    /// database fault.
    #[must_use]
    pub fn from_insert(err: DbErr, group_id: GroupId, user_id: UserId) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::AlreadyMember { group_id, user_id },
            _ => Self::Database(err),
        }
    }
}

impl From<MembershipError> for AppError {
    fn from(err: MembershipError) -> Self {
        match err {
            MembershipError::GroupNotFound(_) | MembershipError::NotFound(_) => {
                Self::NotFound(err.to_string())
            }
            MembershipError::UserNotFound(_) => Self::Validation(err.to_string()),
            MembershipError::AlreadyMember { .. } => Self::Conflict(err.to_string()),
            MembershipError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// A membership joined with its user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberWithUser {
    /// The membership record.
    pub member: group_members::Model,
    /// The member's user, if it still exists.
    pub user: Option<users::Model>,
}

/// Membership repository.
#[derive(Debug, Clone)]
pub struct MembershipRepository {
    db: DatabaseConnection,
}

impl MembershipRepository {
    /// Creates a new membership repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the members of a group in join order.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound` if the group does not exist.
    pub async fn list(&self, group_id: GroupId) -> Result<Vec<MemberWithUser>, MembershipError> {
        self.ensure_group(group_id).await?;

        let rows = group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(group_id.into_inner()))
            .order_by_asc(group_members::Column::JoinedAt)
            .order_by_asc(group_members::Column::Id)
            .find_also_related(users::Entity)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(member, user)| MemberWithUser { member, user })
            .collect())
    }

    /// Adds a user to a group.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound`, `UserNotFound` or `AlreadyMember`.
    pub async fn add(
        &self,
        group_id: GroupId,
        user_id: UserId,
        role: Option<String>,
    ) -> Result<MemberWithUser, MembershipError> {
        self.ensure_group(group_id).await?;

        let user = users::Entity::find_by_id(user_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(MembershipError::UserNotFound(user_id))?;

        let existing = group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(group_id.into_inner()))
            .filter(group_members::Column::UserId.eq(user_id.into_inner()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(MembershipError::AlreadyMember { group_id, user_id });
        }

        let member = group_members::ActiveModel {
            id: Set(MembershipId::new().into_inner()),
            group_id: Set(group_id.into_inner()),
            user_id: Set(user_id.into_inner()),
            role: Set(role),
            joined_at: Set(chrono::Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| MembershipError::from_insert(e, group_id, user_id))?;

        Ok(MemberWithUser {
            member,
            user: Some(user),
        })
    }

    /// Gets one membership of a group.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound` or `NotFound`.
    pub async fn get(
        &self,
        group_id: GroupId,
        member_id: MembershipId,
    ) -> Result<MemberWithUser, MembershipError> {
        self.ensure_group(group_id).await?;

        group_members::Entity::find_by_id(member_id.into_inner())
            .filter(group_members::Column::GroupId.eq(group_id.into_inner()))
            .find_also_related(users::Entity)
            .one(&self.db)
            .await?
            .map(|(member, user)| MemberWithUser { member, user })
            .ok_or(MembershipError::NotFound(member_id))
    }

    /// Sets the role of a membership.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound` or `NotFound`.
    pub async fn set_role(
        &self,
        group_id: GroupId,
        member_id: MembershipId,
        role: Option<String>,
    ) -> Result<MemberWithUser, MembershipError> {
        let MemberWithUser { member, user } = self.get(group_id, member_id).await?;

        let mut active = member.into_active_model();
        active.role = Set(role);
        let member = active.update(&self.db).await?;

        Ok(MemberWithUser { member, user })
    }

    /// Removes a membership. Existing shares are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound` or `NotFound`.
    pub async fn remove(
        &self,
        group_id: GroupId,
        member_id: MembershipId,
    ) -> Result<(), MembershipError> {
        self.ensure_group(group_id).await?;

        let result = group_members::Entity::delete_many()
            .filter(group_members::Column::Id.eq(member_id.into_inner()))
            .filter(group_members::Column::GroupId.eq(group_id.into_inner()))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(MembershipError::NotFound(member_id));
        }
        Ok(())
    }

    async fn ensure_group(&self, group_id: GroupId) -> Result<(), MembershipError> {
        groups::Entity::find_by_id(group_id.into_inner())
            .one(&self.db)
            .await?
            .map(|_| ())
            .ok_or(MembershipError::GroupNotFound(group_id))
    }
}

/// User ids of a group's members in join order.
///
/// This is the order equal splits hand out remainder cents in.
pub(crate) async fn member_user_ids<C>(conn: &C, group_id: Uuid) -> Result<Vec<UserId>, DbErr>
where
    C: ConnectionTrait,
{
    let ids: Vec<Uuid> = group_members::Entity::find()
        .select_only()
        .column(group_members::Column::UserId)
        .filter(group_members::Column::GroupId.eq(group_id))
        .order_by_asc(group_members::Column::JoinedAt)
        .order_by_asc(group_members::Column::Id)
        .into_tuple()
        .all(conn)
        .await?;

    Ok(ids.into_iter().map(UserId::from_uuid).collect())
}
