use std::sync::Arc;

use crate::accounts::materializer::AccountMaterializer;
use crate::accounts::resolver::{IdentityResolver, Match};
use crate::error::{AppError, AppResult};
use crate::ports::incoming::sign_in::SignInUseCase;
use crate::ports::outgoing::{
    account_events::DynAccountEventsPort, account_store::DynAccountStorePort,
    avatar_pipeline::DynAvatarPipelinePort, identity_provider::IdentityProviders,
};
use domain::{
    account::{Account, LinkOutcome},
    events::AccountEvent,
    profile::CanonicalProfile,
    provider::{AuthEvidence, Provider},
};

pub struct SignInServiceDeps {
    pub identity_providers: IdentityProviders,
    pub account_store: DynAccountStorePort,
    pub avatar_pipeline: DynAvatarPipelinePort,
    pub events: DynAccountEventsPort,
}

/// Runs a social sign-in: exchange, normalize, resolve, then link or create.
pub struct SignInService {
    identity_providers: IdentityProviders,
    resolver: IdentityResolver,
    materializer: AccountMaterializer,
    events: DynAccountEventsPort,
}

impl SignInService {
    pub fn new(deps: SignInServiceDeps) -> Self {
        Self {
            identity_providers: deps.identity_providers,
            resolver: IdentityResolver::new(Arc::clone(&deps.account_store)),
            materializer: AccountMaterializer::new(deps.account_store, deps.avatar_pipeline),
            events: deps.events,
        }
    }

    /// Turns a resolution into an account, linking on an email match.
    /// Returns `None` for `Match::NotFound`.
    async fn settle(
        &self,
        provider: Provider,
        profile: &CanonicalProfile,
        resolution: Match,
    ) -> AppResult<Option<Account>> {
        match resolution {
            Match::FoundByEmail(account) => {
                let (account, outcome) = self.resolver.link(provider, profile, account).await?;
                let account_id = account.id;
                self.events.emit(match outcome {
                    LinkOutcome::Linked => AccountEvent::LinkedByEmail {
                        account_id,
                        provider,
                    },
                    LinkOutcome::AlreadyLinked => AccountEvent::MatchedByEmail {
                        account_id,
                        provider,
                    },
                    LinkOutcome::Conflicting => AccountEvent::LinkSkipped {
                        account_id,
                        provider,
                    },
                });
                Ok(Some(account))
            }
            Match::FoundByExternalId(account) => {
                self.events.emit(AccountEvent::MatchedByExternalId {
                    account_id: account.id,
                    provider,
                });
                Ok(Some(account))
            }
            Match::NotFound => Ok(None),
        }
    }

    // A conflicting insert means a concurrent sign-in committed the same
    // person first; resolving again picks up that account.
    async fn create(&self, provider: Provider, profile: &CanonicalProfile) -> AppResult<Account> {
        match self.materializer.materialize(provider, profile).await {
            Ok(account) => {
                self.events.emit(AccountEvent::AccountCreated {
                    account_id: account.id,
                    provider,
                });
                Ok(account)
            }
            Err(AppError::Conflict { message }) => {
                let resolution = self.resolver.resolve(provider, profile).await?;
                self.settle(provider, profile, resolution)
                    .await?
                    .ok_or(AppError::Conflict { message })
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait::async_trait]
impl SignInUseCase for SignInService {
    async fn sign_in(&self, provider: Provider, evidence: AuthEvidence) -> AppResult<Account> {
        let client = self.identity_providers.get(provider)?;
        let raw_profile = client.exchange_and_fetch_profile(&evidence).await?;
        let profile = raw_profile.normalize(provider)?;

        let resolution = self.resolver.resolve(provider, &profile).await?;
        match self.settle(provider, &profile, resolution).await? {
            Some(account) => Ok(account),
            None => self.create(provider, &profile).await,
        }
    }

    fn enabled_providers(&self) -> Vec<Provider> {
        self.identity_providers.enabled()
    }
}
