use crate::error::AppResult;
use domain::{
    account::Account,
    provider::{AuthEvidence, Provider},
};

#[async_trait::async_trait]
pub trait SignInUseCase: Send + Sync {
    async fn sign_in(&self, provider: Provider, evidence: AuthEvidence) -> AppResult<Account>;

    async fn sign_in_with_google(
        &self,
        code: String,
        code_verifier: Option<String>,
    ) -> AppResult<Account> {
        self.sign_in(
            Provider::Google,
            AuthEvidence::AuthorizationCode {
                code,
                code_verifier,
            },
        )
        .await
    }

    async fn sign_in_with_facebook(&self, access_token: String) -> AppResult<Account> {
        self.sign_in(Provider::Facebook, AuthEvidence::AccessToken(access_token))
            .await
    }

    fn enabled_providers(&self) -> Vec<Provider>;
}
