use crate::incoming::http_axum::{dto, handlers};
use domain::provider::Provider;
use dto::common_responses::{
    BadGatewayResponse, BadRequestResponse, ConflictResponse, InternalServerErrorResponse,
    NotFoundResponse, ProviderNotConfiguredResponse, ProviderRejectedResponse,
    UnverifiedEmailResponse, ValidationErrorResponse,
};
use dto::requests::{FacebookSignInRequest, GoogleSignInRequest, UpdateAccountRequest};
use dto::responses::{
    AccountResponse, ApiErrorResponse, ApiResponseAccount, ApiResponseHealth, HealthResponse,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::sign_in::google_sign_in,
        handlers::sign_in::facebook_sign_in,
        handlers::accounts::get_account,
        handlers::accounts::update_account,
        handlers::accounts::update_account_avatar,
    ),
    components(
        schemas(
            GoogleSignInRequest,
            FacebookSignInRequest,
            UpdateAccountRequest,
            AccountResponse,
            HealthResponse,
            ApiResponseAccount,
            ApiResponseHealth,
            ApiErrorResponse,
            Provider
        ),
        responses(
            BadRequestResponse,
            ProviderRejectedResponse,
            UnverifiedEmailResponse,
            NotFoundResponse,
            ConflictResponse,
            ValidationErrorResponse,
            BadGatewayResponse,
            ProviderNotConfiguredResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "auth", description = "Social sign-in - exchange Google or Facebook evidence for an account, linking providers by email"),
        (name = "users", description = "Account maintenance - read an account, edit its attributes and replace its avatar"),
        (name = "system", description = "System health and status monitoring")
    ),
    info(
        title = "Social Accounts API",
        description = "Resolves people signing in through Google or Facebook to a single local account. Accounts are matched by email first, then by the provider's external id, and created with the provider's profile picture when neither matches.",
        contact(
            name = "Social Accounts",
        ),
    ),
    servers(
        (url = "http://localhost:3000", description = "Development server"),
    )
)]
pub struct ApiDoc;
