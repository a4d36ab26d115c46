//! User management routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use sea_orm::prelude::DateTimeWithTimeZone;
use splitledger_db::{
    entities::users,
    repositories::{CreateUserInput, UpdateUserInput, UserRepository},
};
use splitledger_shared::{AppError, types::UserId};
use tracing::info;
use uuid::Uuid;

use super::{double_option, trimmed};
use crate::{
    AppState,
    error::{ApiJson, ApiPath, ApiResult},
};

/// Creates the user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{user_id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a user.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Display name.
    pub name: String,
    /// Optional unique email.
    #[serde(default)]
    pub email: Option<String>,
    /// Optional phone number.
    #[serde(default)]
    pub phone: Option<String>,
}

/// Request body for updating a user.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Email; `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    /// Phone; `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
}

/// Full user representation.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Email.
    pub email: Option<String>,
    /// Phone.
    pub phone: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
}

impl From<users::Model> for UserResponse {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            created_at: user.created_at,
        }
    }
}

/// Compact user representation embedded in other resources.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    /// User ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Email.
    pub email: Option<String>,
}

impl From<users::Model> for UserSummary {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

fn validate_name(name: &str) -> Result<String, AppError> {
    trimmed(name, "name", 120)
}

fn validate_optional(
    value: Option<String>,
    field: &str,
    max: usize,
) -> Result<Option<String>, AppError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) if v.chars().count() > max => Err(AppError::Validation(format!(
            "{field} must be at most {max} characters"
        ))),
        Some(v) => Ok(Some(v.to_string())),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/users`
async fn list_users(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let users = UserRepository::new((*state.db).clone()).list().await?;
    let body: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(body))
}

/// POST `/users`
async fn create_user(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = CreateUserInput {
        name: validate_name(&payload.name)?,
        email: validate_optional(payload.email, "email", 255)?,
        phone: validate_optional(payload.phone, "phone", 50)?,
    };

    let user = UserRepository::new((*state.db).clone())
        .create(input)
        .await?;
    info!(user_id = %user.id, "User created");

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// GET `/users/{user_id}`
async fn get_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<UserId>,
) -> ApiResult<impl IntoResponse> {
    let user = UserRepository::new((*state.db).clone()).get(user_id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// PATCH `/users/{user_id}`
async fn update_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<UserId>,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = UpdateUserInput {
        name: payload.name.as_deref().map(validate_name).transpose()?,
        email: payload
            .email
            .map(|email| validate_optional(email, "email", 255))
            .transpose()?,
        phone: payload
            .phone
            .map(|phone| validate_optional(phone, "phone", 50))
            .transpose()?,
    };

    let user = UserRepository::new((*state.db).clone())
        .update(user_id, input)
        .await?;
    info!(user_id = %user.id, "User updated");

    Ok(Json(UserResponse::from(user)))
}

/// DELETE `/users/{user_id}`
async fn delete_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<UserId>,
) -> ApiResult<impl IntoResponse> {
    UserRepository::new((*state.db).clone())
        .delete(user_id)
        .await?;
    info!(user_id = %user_id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}
