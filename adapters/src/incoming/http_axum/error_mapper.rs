use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, error};

use domain::error::DomainError;
use social_accounts_application::error::AppError;

pub struct HttpError(pub AppError);

impl HttpError {
    fn status_and_message(&self) -> (StatusCode, String) {
        let app_error = &self.0;

        match app_error {
            AppError::Domain(DomainError::UnverifiedEmail { .. }) => {
                (StatusCode::FORBIDDEN, app_error.to_string())
            }

            AppError::Domain(_) => (StatusCode::BAD_REQUEST, app_error.to_string()),

            AppError::InvalidAccount(_)
            | AppError::ValidationError { .. }
            | AppError::UnsupportedImage { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, app_error.to_string())
            }

            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message.clone()),

            AppError::Conflict { message } => (StatusCode::CONFLICT, message.clone()),

            AppError::ProviderAuth { .. } => (StatusCode::UNAUTHORIZED, app_error.to_string()),

            AppError::ProviderNotConfigured { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, app_error.to_string())
            }

            AppError::AvatarIngestion { .. } => (
                StatusCode::BAD_GATEWAY,
                "Avatar could not be ingested".to_string(),
            ),

            AppError::ExternalServiceError { .. } => (
                StatusCode::BAD_GATEWAY,
                "External service error".to_string(),
            ),

            AppError::ConfigError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error".to_string(),
            ),

            AppError::DatabaseError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
            ),

            AppError::IoError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status_code, message) = self.status_and_message();

        if status_code.is_server_error() {
            error!("Server error response generated: {}", self.0);
        } else {
            debug!("Client error response generated: {}", self.0);
        }

        let mut error_response = json!({
            "ok": false,
            "error": message,
            "status": status_code.as_u16()
        });

        if let (AppError::InvalidAccount(validation_error), Some(body)) =
            (&self.0, error_response.as_object_mut())
        {
            body.insert("code".to_string(), json!(validation_error.code()));
        }

        (status_code, Json(error_response)).into_response()
    }
}

impl From<AppError> for HttpError {
    fn from(app_error: AppError) -> Self {
        HttpError(app_error)
    }
}
