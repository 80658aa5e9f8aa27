#[cfg(feature = "docs")]
use utoipa::ToResponse;

#[allow(dead_code)]
#[cfg_attr(feature = "docs", derive(ToResponse))]
#[cfg_attr(feature = "docs", response(description = "Malformed request or provider profile"))]
pub struct BadRequestResponse;

#[allow(dead_code)]
#[cfg_attr(feature = "docs", derive(ToResponse))]
#[cfg_attr(feature = "docs", response(description = "The identity provider rejected the evidence"))]
pub struct ProviderRejectedResponse;

#[allow(dead_code)]
#[cfg_attr(feature = "docs", derive(ToResponse))]
#[cfg_attr(feature = "docs", response(description = "The provider reports the email as unverified"))]
pub struct UnverifiedEmailResponse;

#[allow(dead_code)]
#[cfg_attr(feature = "docs", derive(ToResponse))]
#[cfg_attr(feature = "docs", response(description = "Account not found"))]
pub struct NotFoundResponse;

#[allow(dead_code)]
#[cfg_attr(feature = "docs", derive(ToResponse))]
#[cfg_attr(feature = "docs", response(description = "Email or external id already held by another account"))]
pub struct ConflictResponse;

#[allow(dead_code)]
#[cfg_attr(feature = "docs", derive(ToResponse))]
#[cfg_attr(feature = "docs", response(description = "Validation Error"))]
pub struct ValidationErrorResponse;

#[allow(dead_code)]
#[cfg_attr(feature = "docs", derive(ToResponse))]
#[cfg_attr(feature = "docs", response(description = "Provider or avatar host failed"))]
pub struct BadGatewayResponse;

#[allow(dead_code)]
#[cfg_attr(feature = "docs", derive(ToResponse))]
#[cfg_attr(feature = "docs", response(description = "Provider sign-in is not configured"))]
pub struct ProviderNotConfiguredResponse;

#[allow(dead_code)]
#[cfg_attr(feature = "docs", derive(ToResponse))]
#[cfg_attr(feature = "docs", response(description = "Internal Server Error"))]
pub struct InternalServerErrorResponse;
