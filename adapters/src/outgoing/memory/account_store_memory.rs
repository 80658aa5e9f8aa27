use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{debug, instrument};

use domain::{
    account::{Account, AccountId, AccountPatch},
    provider::Provider,
};
use social_accounts_application::{
    error::{AppError, AppResult},
    ports::outgoing::account_store::AccountStorePort,
};

/// Process-local account store with the same uniqueness rules as the
/// Postgres schema: one account per email and per provider external id.
#[derive(Default)]
pub struct InMemoryAccountStoreAdapter {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl InMemoryAccountStoreAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn conflicting_key(accounts: &HashMap<AccountId, Account>, candidate: &Account) -> Option<String> {
        accounts
            .values()
            .filter(|existing| existing.id != candidate.id)
            .find_map(|existing| {
                if existing.email == candidate.email {
                    return Some("email".to_string());
                }
                Provider::ALL.into_iter().find_map(|provider| {
                    let external_id = candidate.external_id(provider)?;
                    (existing.external_id(provider) == Some(external_id))
                        .then(|| format!("{provider} external id"))
                })
            })
    }

    fn store_checked(
        accounts: &mut HashMap<AccountId, Account>,
        candidate: Account,
    ) -> AppResult<Account> {
        if let Some(key) = Self::conflicting_key(accounts, &candidate) {
            return Err(AppError::Conflict {
                message: format!("{key} already in use"),
            });
        }
        accounts.insert(candidate.id, candidate.clone());
        Ok(candidate)
    }
}

#[async_trait::async_trait]
impl AccountStorePort for InMemoryAccountStoreAdapter {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|account| account.email == email)
            .cloned())
    }

    async fn find_by_external_id(
        &self,
        provider: Provider,
        external_id: &str,
    ) -> AppResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|account| account.external_id(provider) == Some(external_id))
            .cloned())
    }

    async fn find_by_id(&self, id: &AccountId) -> AppResult<Option<Account>> {
        Ok(self.accounts.read().await.get(id).cloned())
    }

    #[instrument(skip(self, account), fields(account_id = %account.id))]
    async fn insert(&self, account: &Account) -> AppResult<Account> {
        let mut accounts = self.accounts.write().await;

        if accounts.contains_key(&account.id) {
            return Err(AppError::Conflict {
                message: format!("Account {} already exists", account.id),
            });
        }
        if let Some(key) = Self::conflicting_key(&accounts, account) {
            return Err(AppError::Conflict {
                message: format!("{key} already in use"),
            });
        }

        accounts.insert(account.id, account.clone());
        debug!("Inserted account {}", account.id);
        Ok(account.clone())
    }

    #[instrument(skip(self))]
    async fn link_external_id(
        &self,
        id: &AccountId,
        provider: Provider,
        external_id: &str,
    ) -> AppResult<Account> {
        let mut accounts = self.accounts.write().await;

        let stored = accounts.get(id).ok_or_else(|| not_found(id))?;
        if stored.external_id(provider).is_some() {
            return Ok(stored.clone());
        }

        let mut candidate = stored.clone();
        candidate.link_external_id(provider, external_id);
        Self::store_checked(&mut accounts, candidate)
    }

    #[instrument(skip(self, patch))]
    async fn update_attributes(&self, id: &AccountId, patch: &AccountPatch) -> AppResult<Account> {
        let mut accounts = self.accounts.write().await;

        let mut candidate = accounts.get(id).ok_or_else(|| not_found(id))?.clone();
        candidate.apply_patch(patch.clone());
        Self::store_checked(&mut accounts, candidate)
    }

    #[instrument(skip(self))]
    async fn update_avatar_url(&self, id: &AccountId, avatar_url: &str) -> AppResult<Account> {
        let mut accounts = self.accounts.write().await;

        let stored = accounts.get_mut(id).ok_or_else(|| not_found(id))?;
        stored.avatar_url = Some(avatar_url.to_string());
        Ok(stored.clone())
    }
}

fn not_found(id: &AccountId) -> AppError {
    AppError::NotFound {
        message: format!("Account {id} not found"),
    }
}
