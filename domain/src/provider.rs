use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Third-party identity providers an account can sign in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Facebook,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Google, Provider::Facebook];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Facebook => "facebook",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(Provider::Google),
            "facebook" => Ok(Provider::Facebook),
            other => Err(DomainError::UnknownProvider(other.to_string())),
        }
    }
}

/// Proof of authentication handed to a provider client.
///
/// Google sign-in carries an authorization code (plus the PKCE verifier when
/// the client used one); Facebook sign-in carries a user access token obtained
/// by the client-side SDK.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthEvidence {
    AuthorizationCode {
        code: String,
        code_verifier: Option<String>,
    },
    AccessToken(String),
}

impl fmt::Debug for AuthEvidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthEvidence::AuthorizationCode { code_verifier, .. } => f
                .debug_struct("AuthorizationCode")
                .field("code", &"[REDACTED]")
                .field("has_code_verifier", &code_verifier.is_some())
                .finish(),
            AuthEvidence::AccessToken(_) => f.debug_tuple("AccessToken").field(&"[REDACTED]").finish(),
        }
    }
}
