//! Group membership routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use splitledger_db::repositories::{MemberWithUser, MembershipRepository};
use splitledger_shared::{
    AppError,
    types::{GroupId, MembershipId, UserId},
};
use tracing::info;
use uuid::Uuid;

use super::{double_option, users::UserSummary};
use crate::{
    AppState,
    error::{ApiJson, ApiPath, ApiResult},
};

/// Maximum role tag length.
const MAX_ROLE_LEN: usize = 50;

/// Creates the membership routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/groups/{group_id}/members", get(list_members).post(add_member))
        .route(
            "/groups/{group_id}/members/{member_id}",
            get(get_member).patch(update_member).delete(remove_member),
        )
}

/// Request body for adding a member.
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    /// User to add.
    pub user_id: UserId,
    /// Optional role tag.
    #[serde(default)]
    pub role: Option<String>,
}

/// Request body for updating a member.
#[derive(Debug, Deserialize)]
pub struct UpdateMemberRequest {
    /// Role tag; `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub role: Option<Option<String>>,
}

/// Membership representation.
#[derive(Debug, Serialize)]
pub struct MemberResponse {
    /// Membership ID.
    pub id: Uuid,
    /// Group ID.
    pub group_id: Uuid,
    /// User ID.
    pub user_id: Uuid,
    /// Role tag.
    pub role: Option<String>,
    /// Join timestamp.
    pub joined_at: DateTimeWithTimeZone,
    /// The member's user.
    pub user: Option<UserSummary>,
}

impl From<MemberWithUser> for MemberResponse {
    fn from(row: MemberWithUser) -> Self {
        Self {
            id: row.member.id,
            group_id: row.member.group_id,
            user_id: row.member.user_id,
            role: row.member.role,
            joined_at: row.member.joined_at,
            user: row.user.map(UserSummary::from),
        }
    }
}

fn validate_role(role: Option<String>) -> Result<Option<String>, AppError> {
    match role {
        Some(role) if role.chars().count() > MAX_ROLE_LEN => Err(AppError::Validation(format!(
            "role must be at most {MAX_ROLE_LEN} characters"
        ))),
        role => Ok(role),
    }
}

/// GET `/groups/{group_id}/members`
async fn list_members(
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<GroupId>,
) -> ApiResult<impl IntoResponse> {
    let members = MembershipRepository::new((*state.db).clone())
        .list(group_id)
        .await?;
    let body: Vec<MemberResponse> = members.into_iter().map(MemberResponse::from).collect();
    Ok(Json(body))
}

/// POST `/groups/{group_id}/members`
async fn add_member(
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<GroupId>,
    ApiJson(payload): ApiJson<AddMemberRequest>,
) -> ApiResult<impl IntoResponse> {
    let role = validate_role(payload.role)?;

    let member = MembershipRepository::new((*state.db).clone())
        .add(group_id, payload.user_id, role)
        .await?;
    info!(
        group_id = %group_id,
        user_id = %payload.user_id,
        member_id = %member.member.id,
        "Member added"
    );

    Ok((StatusCode::CREATED, Json(MemberResponse::from(member))))
}

/// GET `/groups/{group_id}/members/{member_id}`
async fn get_member(
    State(state): State<AppState>,
    ApiPath((group_id, member_id)): ApiPath<(GroupId, MembershipId)>,
) -> ApiResult<impl IntoResponse> {
    let member = MembershipRepository::new((*state.db).clone())
        .get(group_id, member_id)
        .await?;
    Ok(Json(MemberResponse::from(member)))
}

/// PATCH `/groups/{group_id}/members/{member_id}`
async fn update_member(
    State(state): State<AppState>,
    ApiPath((group_id, member_id)): ApiPath<(GroupId, MembershipId)>,
    ApiJson(payload): ApiJson<UpdateMemberRequest>,
) -> ApiResult<impl IntoResponse> {
    let repo = MembershipRepository::new((*state.db).clone());

    let member = match payload.role {
        Some(role) => {
            let member = repo.set_role(group_id, member_id, validate_role(role)?).await?;
            info!(group_id = %group_id, member_id = %member_id, "Member role updated");
            member
        }
        None => repo.get(group_id, member_id).await?,
    };

    Ok(Json(MemberResponse::from(member)))
}

/// DELETE `/groups/{group_id}/members/{member_id}`
async fn remove_member(
    State(state): State<AppState>,
    ApiPath((group_id, member_id)): ApiPath<(GroupId, MembershipId)>,
) -> ApiResult<impl IntoResponse> {
    MembershipRepository::new((*state.db).clone())
        .remove(group_id, member_id)
        .await?;
    info!(group_id = %group_id, member_id = %member_id, "Member removed");

    Ok(StatusCode::NO_CONTENT)
}
