//! Group management routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use splitledger_db::{entities::groups, repositories::GroupRepository};
use splitledger_shared::types::{GroupId, UserId};
use tracing::info;
use uuid::Uuid;

use super::trimmed;
use crate::{
    AppState,
    error::{ApiJson, ApiPath, ApiResult},
};

/// Maximum group name length.
const MAX_NAME_LEN: usize = 150;

/// Creates the group routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/groups", get(list_groups).post(create_group))
        .route(
            "/groups/{group_id}",
            get(get_group).patch(update_group).delete(delete_group),
        )
}

/// Request body for creating a group.
#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    /// Group name.
    pub name: String,
    /// Creator, if any.
    #[serde(default)]
    pub created_by_user_id: Option<UserId>,
}

/// Request body for updating a group.
#[derive(Debug, Deserialize)]
pub struct UpdateGroupRequest {
    /// New name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Group representation.
#[derive(Debug, Serialize)]
pub struct GroupResponse {
    /// Group ID.
    pub id: Uuid,
    /// Group name.
    pub name: String,
    /// Creator.
    pub created_by_user_id: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
}

impl From<groups::Model> for GroupResponse {
    fn from(group: groups::Model) -> Self {
        Self {
            id: group.id,
            name: group.name,
            created_by_user_id: group.created_by_user_id,
            created_at: group.created_at,
        }
    }
}

/// GET `/groups`
async fn list_groups(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let groups = GroupRepository::new((*state.db).clone()).list().await?;
    let body: Vec<GroupResponse> = groups.into_iter().map(GroupResponse::from).collect();
    Ok(Json(body))
}

/// POST `/groups`
async fn create_group(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateGroupRequest>,
) -> ApiResult<impl IntoResponse> {
    let name = trimmed(&payload.name, "name", MAX_NAME_LEN)?;

    let group = GroupRepository::new((*state.db).clone())
        .create(name, payload.created_by_user_id)
        .await?;
    info!(group_id = %group.id, "Group created");

    Ok((StatusCode::CREATED, Json(GroupResponse::from(group))))
}

/// GET `/groups/{group_id}`
async fn get_group(
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<GroupId>,
) -> ApiResult<impl IntoResponse> {
    let group = GroupRepository::new((*state.db).clone())
        .get(group_id)
        .await?;
    Ok(Json(GroupResponse::from(group)))
}

/// PATCH `/groups/{group_id}`
async fn update_group(
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<GroupId>,
    ApiJson(payload): ApiJson<UpdateGroupRequest>,
) -> ApiResult<impl IntoResponse> {
    let repo = GroupRepository::new((*state.db).clone());

    let group = match payload.name {
        Some(name) => {
            let name = trimmed(&name, "name", MAX_NAME_LEN)?;
            let group = repo.rename(group_id, name).await?;
            info!(group_id = %group_id, "Group renamed");
            group
        }
        None => repo.get(group_id).await?,
    };

    Ok(Json(GroupResponse::from(group)))
}

/// DELETE `/groups/{group_id}`
///
/// Receipt files of the deleted expenses are removed after the commit.
async fn delete_group(
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<GroupId>,
) -> ApiResult<impl IntoResponse> {
    let receipts = GroupRepository::new((*state.db).clone())
        .delete(group_id)
        .await?;
    info!(group_id = %group_id, receipts = receipts.len(), "Group deleted");

    if let Some(storage) = &state.storage {
        for name in &receipts {
            storage.remove_best_effort(name).await;
        }
    }

    Ok(StatusCode::NO_CONTENT)
}
