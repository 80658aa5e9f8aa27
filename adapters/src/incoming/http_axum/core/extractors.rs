use axum::extract::Path;
use uuid::Uuid;

use domain::account::AccountId;
use social_accounts_application::error::AppError;

use crate::incoming::http_axum::error_mapper::HttpError;

pub type AccountIdPath = Path<String>;

pub fn extract_account_id(Path(raw_id): AccountIdPath) -> Result<AccountId, HttpError> {
    Uuid::parse_str(raw_id.trim())
        .map(AccountId::from_uuid)
        .map_err(|_| {
            HttpError(AppError::ValidationError {
                message: format!("Invalid account id: {raw_id}"),
            })
        })
}
