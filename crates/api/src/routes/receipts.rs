//! Receipt upload, download and removal routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::header,
    response::IntoResponse,
    routing::get,
};
use splitledger_core::{receipt::ReceiptService, storage::ReceiptStorage};
use splitledger_db::repositories::{ExpenseRepository, ReceiptRepository};
use splitledger_shared::{AppError, types::ExpenseId};
use tracing::info;

use super::expenses::ExpenseResponse;
use crate::{
    AppState,
    error::{ApiPath, ApiResult},
};

/// Multipart framing allowance on top of the file size limit.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// Fallback MIME type for downloads.
const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Creates the receipt routes.
///
/// The request body limit follows the configured maximum file size.
pub fn routes(state: &AppState) -> Router<AppState> {
    let router = Router::new().route(
        "/expenses/{expense_id}/receipt",
        get(download_receipt)
            .post(upload_receipt)
            .delete(delete_receipt),
    );

    match &state.storage {
        Some(storage) => {
            let limit = storage.config().max_file_size.saturating_add(MULTIPART_OVERHEAD);
            router.layer(DefaultBodyLimit::max(
                usize::try_from(limit).unwrap_or(usize::MAX),
            ))
        }
        None => router,
    }
}

fn receipt_service(
    state: &AppState,
) -> Result<ReceiptService<ReceiptRepository>, AppError> {
    let storage: Arc<ReceiptStorage> = state.storage.clone().ok_or_else(|| {
        AppError::ServiceUnavailable("Receipt storage is not configured".to_string())
    })?;
    let repo = ReceiptRepository::new((*state.db).clone());
    Ok(ReceiptService::new(storage, Arc::new(repo)))
}

async fn expense_response(state: &AppState, expense_id: ExpenseId) -> ApiResult<ExpenseResponse> {
    let expense = ExpenseRepository::new((*state.db).clone())
        .get(expense_id)
        .await?;
    Ok(ExpenseResponse::from(expense))
}

fn bad_multipart(err: &axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(err.body_text())
}

/// POST `/expenses/{expense_id}/receipt`
///
/// Expects a multipart body with a `file` field. Replaces any existing
/// receipt.
async fn upload_receipt(
    State(state): State<AppState>,
    ApiPath(expense_id): ApiPath<ExpenseId>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let service = receipt_service(&state)?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_multipart(&e))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let mime_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| bad_multipart(&e))?;
        upload = Some((filename, mime_type, bytes));
        break;
    }

    let Some((filename, mime_type, bytes)) = upload else {
        return Err(AppError::Validation("No file part in the request".to_string()).into());
    };

    let size = bytes.len();
    let receipt = service.attach(expense_id, &filename, mime_type, bytes).await?;
    info!(
        expense_id = %expense_id,
        filename = %receipt.filename,
        size,
        "Receipt uploaded"
    );

    Ok(Json(expense_response(&state, expense_id).await?))
}

/// GET `/expenses/{expense_id}/receipt`
async fn download_receipt(
    State(state): State<AppState>,
    ApiPath(expense_id): ApiPath<ExpenseId>,
) -> ApiResult<impl IntoResponse> {
    let (receipt, bytes) = receipt_service(&state)?.download(expense_id).await?;
    let content_type = receipt
        .mime_type
        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}

/// DELETE `/expenses/{expense_id}/receipt`
async fn delete_receipt(
    State(state): State<AppState>,
    ApiPath(expense_id): ApiPath<ExpenseId>,
) -> ApiResult<impl IntoResponse> {
    receipt_service(&state)?.remove(expense_id).await?;
    info!(expense_id = %expense_id, "Receipt deleted");

    Ok(Json(expense_response(&state, expense_id).await?))
}
