use std::fmt;

use oauth2::{
    AccessToken, AuthUrl, AuthorizationCode, ClientId, ClientSecret, PkceCodeVerifier, RedirectUrl,
    RequestTokenError, TokenResponse, TokenUrl, basic::BasicClient,
};
use reqwest::{StatusCode, redirect::Policy};
use tracing::{debug, error, instrument, warn};

use domain::{
    profile::{GoogleProfile, RawProfile},
    provider::{AuthEvidence, Provider},
};
use social_accounts_application::{
    error::{AppError, AppResult},
    infrastructure_config::GoogleProviderConfig,
    ports::outgoing::identity_provider::IdentityProviderPort,
};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Exchanges an authorization code at Google's token endpoint and reads the
/// OpenID userinfo document with the resulting access token.
pub struct GoogleIdentityAdapter {
    client_id: ClientId,
    client_secret: ClientSecret,
    auth_url: AuthUrl,
    token_url: TokenUrl,
    redirect_url: RedirectUrl,
    userinfo_url: String,
    http_client: reqwest::Client,
}

impl GoogleIdentityAdapter {
    /// Returns `Ok(None)` when the provider has no credentials configured.
    pub fn from_config(config: &GoogleProviderConfig) -> AppResult<Option<Self>> {
        let Some((client_id, client_secret, redirect_url)) = config.credentials() else {
            return Ok(None);
        };

        let config_error = |what: &str, e: &dyn fmt::Display| AppError::ConfigError {
            message: format!("Invalid Google {what}: {e}"),
        };

        let http_client = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()
            .map_err(|e| config_error("HTTP client", &e))?;

        Ok(Some(Self {
            client_id: ClientId::new(client_id.to_string()),
            client_secret: ClientSecret::new(client_secret.to_string()),
            auth_url: AuthUrl::new(GOOGLE_AUTH_URL.to_string())
                .map_err(|e| config_error("auth URL", &e))?,
            token_url: TokenUrl::new(GOOGLE_TOKEN_URL.to_string())
                .map_err(|e| config_error("token URL", &e))?,
            redirect_url: RedirectUrl::new(redirect_url.to_string())
                .map_err(|e| config_error("redirect URL", &e))?,
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
            http_client,
        }))
    }

    #[instrument(skip_all)]
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> AppResult<AccessToken> {
        let client = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_auth_uri(self.auth_url.clone())
            .set_token_uri(self.token_url.clone())
            .set_redirect_uri(self.redirect_url.clone());

        let mut request = client.exchange_code(AuthorizationCode::new(code.to_string()));
        if let Some(verifier) = code_verifier {
            request = request.set_pkce_verifier(PkceCodeVerifier::new(verifier.to_string()));
        }

        let token = request
            .request_async(&self.http_client)
            .await
            .map_err(|e| match e {
                RequestTokenError::ServerResponse(response) => {
                    warn!("Google rejected authorization code: {}", response);
                    AppError::ProviderAuth {
                        provider: Provider::Google,
                        message: response.to_string(),
                    }
                }
                other => {
                    error!("Google token exchange failed: {}", other);
                    AppError::ExternalServiceError {
                        message: format!("Google token exchange failed: {other}"),
                    }
                }
            })?;

        Ok(token.access_token().clone())
    }

    #[instrument(skip_all)]
    async fn fetch_userinfo(&self, access_token: &AccessToken) -> AppResult<GoogleProfile> {
        let response = self
            .http_client
            .get(&self.userinfo_url)
            .bearer_auth(access_token.secret())
            .send()
            .await
            .map_err(|e| {
                error!("Failed to fetch Google userinfo: {}", e);
                AppError::ExternalServiceError {
                    message: format!("Google userinfo request failed: {e}"),
                }
            })?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(AppError::ProviderAuth {
                    provider: Provider::Google,
                    message: "access token was not accepted by userinfo".to_string(),
                });
            }
            status => {
                error!("Google userinfo returned {}", status);
                return Err(AppError::ExternalServiceError {
                    message: format!("Google userinfo returned {status}"),
                });
            }
        }

        let profile: GoogleProfile = response.json().await.map_err(|e| {
            error!("Failed to parse Google userinfo: {}", e);
            AppError::ExternalServiceError {
                message: format!("Invalid Google userinfo payload: {e}"),
            }
        })?;

        debug!(sub = %profile.sub, "Fetched Google userinfo");
        Ok(profile)
    }
}

#[async_trait::async_trait]
impl IdentityProviderPort for GoogleIdentityAdapter {
    fn provider(&self) -> Provider {
        Provider::Google
    }

    async fn exchange_and_fetch_profile(&self, evidence: &AuthEvidence) -> AppResult<RawProfile> {
        let AuthEvidence::AuthorizationCode {
            code,
            code_verifier,
        } = evidence
        else {
            return Err(AppError::ValidationError {
                message: "Google sign-in requires an authorization code".to_string(),
            });
        };

        let access_token = self.exchange_code(code, code_verifier.as_deref()).await?;
        let profile = self.fetch_userinfo(&access_token).await?;
        Ok(RawProfile::Google(profile))
    }
}
