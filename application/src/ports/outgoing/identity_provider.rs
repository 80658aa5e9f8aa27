use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use domain::{
    profile::RawProfile,
    provider::{AuthEvidence, Provider},
};

/// Client for one identity provider: verifies the evidence and returns the
/// authenticated person's profile.
#[async_trait::async_trait]
pub trait IdentityProviderPort: Send + Sync {
    fn provider(&self) -> Provider;
    async fn exchange_and_fetch_profile(&self, evidence: &AuthEvidence) -> AppResult<RawProfile>;
}

pub type DynIdentityProviderPort = Arc<dyn IdentityProviderPort>;

#[derive(Clone, Default)]
pub struct IdentityProviders {
    clients: HashMap<Provider, DynIdentityProviderPort>,
}

impl IdentityProviders {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, client: DynIdentityProviderPort) -> Self {
        self.clients.insert(client.provider(), client);
        self
    }

    pub fn get(&self, provider: Provider) -> AppResult<&DynIdentityProviderPort> {
        self.clients
            .get(&provider)
            .ok_or(AppError::ProviderNotConfigured { provider })
    }

    #[must_use]
    pub fn enabled(&self) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|provider| self.clients.contains_key(provider))
            .collect()
    }
}
