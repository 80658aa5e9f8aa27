use reqwest::{Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, error, instrument, warn};

use domain::{
    profile::{FacebookProfile, RawProfile},
    provider::{AuthEvidence, Provider},
};
use social_accounts_application::{
    error::{AppError, AppResult},
    infrastructure_config::FacebookProviderConfig,
    ports::outgoing::identity_provider::IdentityProviderPort,
};

const GRAPH_BASE_URL: &str = "https://graph.facebook.com";
const PROFILE_FIELDS: &str = "id,email,first_name,last_name,name,picture.type(large)";

#[derive(Debug, Deserialize)]
struct DebugTokenEnvelope {
    data: DebugTokenData,
}

#[derive(Debug, Deserialize)]
struct DebugTokenData {
    app_id: Option<String>,
    #[serde(default)]
    is_valid: bool,
    user_id: Option<String>,
}

/// Verifies a client-side Facebook user access token with `debug_token`,
/// then reads the user's Graph `me` node.
pub struct FacebookIdentityAdapter {
    app_id: String,
    app_secret: SecretString,
    graph_url: String,
    http_client: reqwest::Client,
}

impl FacebookIdentityAdapter {
    /// Returns `Ok(None)` when the provider has no credentials configured.
    pub fn from_config(config: &FacebookProviderConfig) -> AppResult<Option<Self>> {
        let Some((app_id, app_secret)) = config.credentials() else {
            return Ok(None);
        };

        let http_client = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::ConfigError {
                message: format!("Invalid Facebook HTTP client: {e}"),
            })?;

        Ok(Some(Self {
            app_id: app_id.to_string(),
            app_secret: SecretString::from(app_secret),
            graph_url: format!("{GRAPH_BASE_URL}/{}", config.graph_api_version.trim()),
            http_client,
        }))
    }

    fn rejected(message: impl Into<String>) -> AppError {
        AppError::ProviderAuth {
            provider: Provider::Facebook,
            message: message.into(),
        }
    }

    async fn check_status(response: Response, endpoint: &str) -> AppResult<Response> {
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let body = response.text().await.unwrap_or_default();
                warn!("Facebook {} rejected the token: {}", endpoint, body);
                Err(Self::rejected(format!("{endpoint} rejected the access token")))
            }
            status => {
                error!("Facebook {} returned {}", endpoint, status);
                Err(AppError::ExternalServiceError {
                    message: format!("Facebook {endpoint} returned {status}"),
                })
            }
        }
    }

    /// Returns the Facebook user id the token was issued for.
    #[instrument(skip_all)]
    async fn debug_token(&self, access_token: &str) -> AppResult<String> {
        let app_token = format!("{}|{}", self.app_id, self.app_secret.expose_secret());
        let response = self
            .http_client
            .get(format!("{}/debug_token", self.graph_url))
            .query(&[("input_token", access_token), ("access_token", app_token.as_str())])
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError {
                message: format!("Facebook debug_token request failed: {e}"),
            })?;

        let envelope: DebugTokenEnvelope = Self::check_status(response, "debug_token")
            .await?
            .json()
            .await
            .map_err(|e| AppError::ExternalServiceError {
                message: format!("Invalid Facebook debug_token payload: {e}"),
            })?;

        verify_token_data(envelope.data, &self.app_id)
    }

    #[instrument(skip_all)]
    async fn fetch_me(&self, access_token: &str) -> AppResult<FacebookProfile> {
        let response = self
            .http_client
            .get(format!("{}/me", self.graph_url))
            .query(&[("fields", PROFILE_FIELDS), ("access_token", access_token)])
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError {
                message: format!("Facebook profile request failed: {e}"),
            })?;

        Self::check_status(response, "me")
            .await?
            .json()
            .await
            .map_err(|e| AppError::ExternalServiceError {
                message: format!("Invalid Facebook profile payload: {e}"),
            })
    }
}

fn verify_token_data(data: DebugTokenData, app_id: &str) -> AppResult<String> {
    if !data.is_valid {
        return Err(FacebookIdentityAdapter::rejected("access token is not valid"));
    }
    if data.app_id.as_deref() != Some(app_id) {
        return Err(FacebookIdentityAdapter::rejected(
            "access token was issued to a different app",
        ));
    }
    data.user_id
        .ok_or_else(|| FacebookIdentityAdapter::rejected("access token carries no user"))
}

#[async_trait::async_trait]
impl IdentityProviderPort for FacebookIdentityAdapter {
    fn provider(&self) -> Provider {
        Provider::Facebook
    }

    async fn exchange_and_fetch_profile(&self, evidence: &AuthEvidence) -> AppResult<RawProfile> {
        let AuthEvidence::AccessToken(access_token) = evidence else {
            return Err(AppError::ValidationError {
                message: "Facebook sign-in requires an access token".to_string(),
            });
        };

        let user_id = self.debug_token(access_token).await?;
        let profile = self.fetch_me(access_token).await?;

        if profile.id != user_id {
            return Err(Self::rejected("profile does not belong to the token's user"));
        }

        debug!(id = %profile.id, "Fetched Facebook profile");
        Ok(RawProfile::Facebook(profile))
    }
}
