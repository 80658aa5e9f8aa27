use std::path::{Path, PathBuf};

use axum::{Json, body::Bytes, extract::State};
use tokio::fs;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

#[cfg(feature = "docs")]
use crate::incoming::http_axum::dto::{
    common_responses::{
        BadGatewayResponse, ConflictResponse, InternalServerErrorResponse, NotFoundResponse,
        ValidationErrorResponse,
    },
    responses::ApiResponseAccount,
};
use crate::incoming::http_axum::{
    core::extractors::{AccountIdPath, extract_account_id},
    dto::{
        requests::UpdateAccountRequest,
        responses::{AccountResponse, ApiResponse},
    },
    error_mapper::HttpError,
};
use crate::shared::app_state::AppState;
use social_accounts_application::error::AppError;

const UPLOADS_DIR: &str = "tmp";

#[cfg_attr(feature = "docs", utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "Account id")),
    responses(
        (status = 200, description = "The account", body = ApiResponseAccount),
        (status = 404, response = NotFoundResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "users",
    summary = "Get an account"
))]
pub async fn get_account(
    State(state): State<AppState>,
    path: AccountIdPath,
) -> Result<Json<ApiResponse<AccountResponse>>, HttpError> {
    let id = extract_account_id(path)?;
    let account = state.account_use_case.get_account(id).await?;
    Ok(Json(ApiResponse::success_with_data(Some(account.into()))))
}

#[cfg_attr(feature = "docs", utoipa::path(
    patch,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "Account id")),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated", body = ApiResponseAccount),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "users",
    summary = "Update account attributes",
    description = "Changes first name, last name and email. A field left empty fails with `first_name_required`, `last_name_required` or `email_required` (checked in that order) and nothing is saved."
))]
pub async fn update_account(
    State(state): State<AppState>,
    path: AccountIdPath,
    Json(request): Json<UpdateAccountRequest>,
) -> Result<Json<ApiResponse<AccountResponse>>, HttpError> {
    let id = extract_account_id(path)?;
    request.validate().map_err(|e| {
        HttpError(AppError::ValidationError {
            message: format!("Validation failed: {}", e),
        })
    })?;

    let account = state
        .account_use_case
        .update_account(id, request.into())
        .await?;
    Ok(Json(ApiResponse::success_with_data(Some(account.into()))))
}

#[cfg_attr(feature = "docs", utoipa::path(
    put,
    path = "/users/{id}/avatar",
    params(("id" = Uuid, Path, description = "Account id")),
    request_body(content = Vec<u8>, description = "Raw image bytes (PNG, JPEG, GIF, WebP)", content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Avatar replaced", body = ApiResponseAccount),
        (status = 404, response = NotFoundResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 502, response = BadGatewayResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "users",
    summary = "Replace the account avatar"
))]
pub async fn update_account_avatar(
    State(state): State<AppState>,
    path: AccountIdPath,
    body: Bytes,
) -> Result<Json<ApiResponse<AccountResponse>>, HttpError> {
    let id = extract_account_id(path)?;
    if body.is_empty() {
        return Err(HttpError(AppError::ValidationError {
            message: "Avatar body is empty".to_string(),
        }));
    }

    let upload_path = spool_upload(Path::new(&state.config.avatars.storage_dir), &body).await?;
    let result = state
        .account_use_case
        .update_account_avatar(id, &upload_path)
        .await;

    if let Err(e) = fs::remove_file(&upload_path).await {
        warn!("Failed to remove spooled upload {}: {}", upload_path.display(), e);
    }

    Ok(Json(ApiResponse::success_with_data(Some(result?.into()))))
}

async fn spool_upload(storage_dir: &Path, body: &[u8]) -> Result<PathBuf, AppError> {
    let uploads_dir = storage_dir.join(UPLOADS_DIR);
    fs::create_dir_all(&uploads_dir).await?;
    let upload_path = uploads_dir.join(format!("{}.upload", Uuid::new_v4()));
    fs::write(&upload_path, body).await?;
    Ok(upload_path)
}
