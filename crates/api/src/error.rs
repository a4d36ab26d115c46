//! Error responses.
//!
//! Every failure leaves the API as `{"error": <code>, "message": <text>}`.

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Path, Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde_json::json;
use splitledger_core::receipt::ReceiptError;
use splitledger_db::repositories::{
    BalanceError, ExpenseError, GroupError, MembershipError, UserError,
};
use splitledger_shared::AppError;
use tracing::error;

/// Result type for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Handler error rendered as a JSON body with the matching status.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

macro_rules! api_error_from {
    ($($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for ApiError {
                fn from(err: $source) -> Self {
                    Self(AppError::from(err))
                }
            }
        )+
    };
}

api_error_from!(
    BalanceError,
    ExpenseError,
    GroupError,
    MembershipError,
    ReceiptError,
    UserError,
);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.0.is_server_error() {
            error!(error = %self.0, "Request failed");
        }

        json_error(status, self.0.error_code(), self.0.message())
    }
}

/// Builds a JSON error response.
pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// `Json` extractor whose rejections use the API error format.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError(AppError::Validation(rejection_message(&rejection)))),
        }
    }
}

fn rejection_message(rejection: &JsonRejection) -> String {
    rejection.body_text()
}

/// `Path` extractor whose rejections, such as a malformed id, use the API
/// error format.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError(AppError::Validation(path_rejection_message(
                &rejection,
            )))),
        }
    }
}

fn path_rejection_message(rejection: &PathRejection) -> String {
    rejection.body_text()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::NotFound("x".into()), StatusCode::NOT_FOUND)]
    #[case(AppError::Validation("x".into()), StatusCode::BAD_REQUEST)]
    #[case(AppError::Conflict("x".into()), StatusCode::CONFLICT)]
    #[case(AppError::ServiceUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(AppError::Database("x".into()), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_api_error_status(#[case] err: AppError, #[case] expected: StatusCode) {
        assert_eq!(ApiError(err).into_response().status(), expected);
    }
}
