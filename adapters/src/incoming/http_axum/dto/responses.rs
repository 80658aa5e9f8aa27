use serde::Serialize;
use time::format_description::well_known::Rfc3339;
#[cfg(feature = "docs")]
use utoipa::ToSchema;
use uuid::Uuid;

use domain::{account::Account, provider::Provider};

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[cfg_attr(feature = "docs", schema(
    description = "Standard API response wrapper with success indicator, optional error message, and optional data payload",
    example = json!({
        "ok": true,
        "data": {
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "first_name": "Jane",
            "last_name": "Doe",
            "email": "jane@example.com"
        }
    })
))]
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    #[must_use]
    pub fn success_with_data(data: Option<T>) -> Self {
        Self {
            ok: true,
            error: None,
            data,
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[cfg_attr(feature = "docs", schema(
    description = "Account data returned by sign-in and account endpoints",
    example = json!({
        "id": "550e8400-e29b-41d4-a716-446655440000",
        "first_name": "Jane",
        "last_name": "Doe",
        "email": "jane@example.com",
        "avatar_url": "/media/avatars/550e8400-e29b-41d4-a716-446655440000/0b1c5a52-7a3e-4e4f-9d51-2f7b8a1d9c11.webp",
        "google_external_id": "109876543210987654321",
        "facebook_external_id": null,
        "linked_providers": ["google"],
        "registration_date": "2025-03-01T12:00:00Z"
    })
))]
#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub google_external_id: Option<String>,
    pub facebook_external_id: Option<String>,
    pub linked_providers: Vec<Provider>,
    pub registration_date: String,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        let linked_providers = Provider::ALL
            .into_iter()
            .filter(|provider| account.external_id(*provider).is_some())
            .collect();

        Self {
            id: *account.id.as_uuid(),
            registration_date: account
                .registration_date
                .format(&Rfc3339)
                .unwrap_or_else(|_| account.registration_date.to_string()),
            first_name: account.first_name,
            last_name: account.last_name,
            email: account.email,
            avatar_url: account.avatar_url,
            google_external_id: account.google_external_id,
            facebook_external_id: account.facebook_external_id,
            linked_providers,
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub providers: Vec<Provider>,
}

#[cfg(feature = "docs")]
#[derive(serde::Serialize, utoipa::ToSchema)]
#[schema(title = "ApiResponseAccount")]
pub struct ApiResponseAccount {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<AccountResponse>,
}

#[cfg(feature = "docs")]
#[derive(serde::Serialize, utoipa::ToSchema)]
#[schema(title = "ApiResponseHealth")]
pub struct ApiResponseHealth {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<HealthResponse>,
}

#[cfg(feature = "docs")]
#[derive(serde::Serialize, utoipa::ToSchema)]
#[schema(title = "ApiErrorResponse")]
pub struct ApiErrorResponse {
    pub ok: bool,
    pub error: String,
    pub status: u16,
    /// Present for named account validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}
