use std::sync::Arc;

use crate::error::AppResult;
use domain::{
    account::{Account, AccountId, AccountPatch},
    provider::Provider,
};

/// Persistence for accounts. Lookups return `Ok(None)` when nothing matches.
///
/// Changes to an existing account are narrow single-record writes: each one
/// touches only its own columns, so concurrent changes to other attributes of
/// the same account are never overwritten.
#[async_trait::async_trait]
pub trait AccountStorePort: Send + Sync {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>>;
    async fn find_by_external_id(
        &self,
        provider: Provider,
        external_id: &str,
    ) -> AppResult<Option<Account>>;
    async fn find_by_id(&self, id: &AccountId) -> AppResult<Option<Account>>;
    /// Fails with `AppError::Conflict` when the email or an external id is
    /// already held by another account.
    async fn insert(&self, account: &Account) -> AppResult<Account>;
    /// Fills the provider's external id only while it is empty and returns the
    /// stored account. If the slot was already filled the account comes back
    /// as stored, unchanged. Fails with `AppError::Conflict` when another
    /// account holds the id and `AppError::NotFound` when the account is gone.
    async fn link_external_id(
        &self,
        id: &AccountId,
        provider: Provider,
        external_id: &str,
    ) -> AppResult<Account>;
    /// Writes the attributes present in `patch`, leaving the others as stored.
    async fn update_attributes(&self, id: &AccountId, patch: &AccountPatch) -> AppResult<Account>;
    async fn update_avatar_url(&self, id: &AccountId, avatar_url: &str) -> AppResult<Account>;
}

pub type DynAccountStorePort = Arc<dyn AccountStorePort>;
