use axum::{Json, extract::State};
use tracing::info;
use validator::Validate;

#[cfg(feature = "docs")]
use crate::incoming::http_axum::dto::{
    common_responses::{
        BadGatewayResponse, BadRequestResponse, ConflictResponse, InternalServerErrorResponse,
        ProviderNotConfiguredResponse, ProviderRejectedResponse, UnverifiedEmailResponse,
        ValidationErrorResponse,
    },
    responses::ApiResponseAccount,
};
use crate::incoming::http_axum::{
    dto::{
        requests::{FacebookSignInRequest, GoogleSignInRequest},
        responses::{AccountResponse, ApiResponse},
    },
    error_mapper::HttpError,
};
use crate::shared::app_state::AppState;
use social_accounts_application::error::AppError;

fn validate_request(request: &impl Validate) -> Result<(), HttpError> {
    request.validate().map_err(|e| {
        HttpError(AppError::ValidationError {
            message: format!("Validation failed: {}", e),
        })
    })
}

#[cfg_attr(feature = "docs", utoipa::path(
    post,
    path = "/auth/google",
    request_body = GoogleSignInRequest,
    responses(
        (status = 200, description = "Signed in; the account was matched, linked or created", body = ApiResponseAccount),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = ProviderRejectedResponse),
        (status = 403, response = UnverifiedEmailResponse),
        (status = 409, response = ConflictResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 502, response = BadGatewayResponse),
        (status = 503, response = ProviderNotConfiguredResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "auth",
    summary = "Sign in with Google",
    description = "Exchanges a Google authorization code, then resolves the person to an account: an account with the same email is reused (and linked to the Google id if it has none), otherwise an account already linked to the Google id is reused, otherwise a new account is created with the Google profile picture as avatar."
))]
pub async fn google_sign_in(
    State(state): State<AppState>,
    Json(request): Json<GoogleSignInRequest>,
) -> Result<Json<ApiResponse<AccountResponse>>, HttpError> {
    validate_request(&request)?;

    let account = state
        .sign_in_use_case
        .sign_in_with_google(request.code, request.code_verifier)
        .await?;

    info!(account_id = %account.id, "Google sign-in completed");
    Ok(Json(ApiResponse::success_with_data(Some(account.into()))))
}

#[cfg_attr(feature = "docs", utoipa::path(
    post,
    path = "/auth/facebook",
    request_body = FacebookSignInRequest,
    responses(
        (status = 200, description = "Signed in; the account was matched, linked or created", body = ApiResponseAccount),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = ProviderRejectedResponse),
        (status = 409, response = ConflictResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 502, response = BadGatewayResponse),
        (status = 503, response = ProviderNotConfiguredResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "auth",
    summary = "Sign in with Facebook",
    description = "Verifies a Facebook user access token against the configured app, then resolves the person to an account with the same rules as Google sign-in."
))]
pub async fn facebook_sign_in(
    State(state): State<AppState>,
    Json(request): Json<FacebookSignInRequest>,
) -> Result<Json<ApiResponse<AccountResponse>>, HttpError> {
    validate_request(&request)?;

    let account = state
        .sign_in_use_case
        .sign_in_with_facebook(request.access_token)
        .await?;

    info!(account_id = %account.id, "Facebook sign-in completed");
    Ok(Json(ApiResponse::success_with_data(Some(account.into()))))
}
