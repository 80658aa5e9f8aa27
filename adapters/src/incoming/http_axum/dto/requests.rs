use serde::{Deserialize, Serialize};
#[cfg(feature = "docs")]
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail, ValidationError};

use domain::account::AccountPatch;

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[cfg_attr(feature = "docs", schema(
    description = "Authorization code obtained by the client from Google's consent screen. Include the PKCE verifier when the client generated a code challenge.",
    example = json!({
        "code": "4/0AdQt8qh...",
        "code_verifier": "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"
    })
))]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GoogleSignInRequest {
    #[validate(length(min = 1, max = 2048))]
    pub code: String,
    #[validate(length(min = 43, max = 128))]
    pub code_verifier: Option<String>,
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[cfg_attr(feature = "docs", schema(
    description = "User access token obtained by the client-side Facebook SDK.",
    example = json!({
        "access_token": "EAAGm0PX4ZCpsBA..."
    })
))]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FacebookSignInRequest {
    #[validate(length(min = 1, max = 4096))]
    pub access_token: String,
}

/// Partial account update. Absent fields are left untouched; any other keys
/// in the body are ignored.
#[cfg_attr(feature = "docs", derive(ToSchema))]
#[cfg_attr(feature = "docs", schema(
    description = "Attributes to change on the account. Omitted fields keep their current value; an empty string fails validation with a named code.",
    example = json!({
        "first_name": "Jane",
        "last_name": "Doe"
    })
))]
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateAccountRequest {
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[validate(length(max = 254), custom(function = "validate_email_shape"))]
    pub email: Option<String>,
}

// Blank emails pass here so the account rules report `email_required`.
fn validate_email_shape(email: &str) -> Result<(), ValidationError> {
    let trimmed = email.trim();
    if trimmed.is_empty() || trimmed.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_email"))
    }
}

impl From<UpdateAccountRequest> for AccountPatch {
    fn from(request: UpdateAccountRequest) -> Self {
        AccountPatch {
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email.map(|email| email.trim().to_string()),
        }
    }
}
