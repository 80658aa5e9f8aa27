use std::path::Path;

use crate::error::AppResult;
use domain::account::{Account, AccountId, AccountPatch};

#[async_trait::async_trait]
pub trait AccountUseCase: Send + Sync {
    async fn get_account(&self, id: AccountId) -> AppResult<Account>;
    async fn update_account(&self, id: AccountId, patch: AccountPatch) -> AppResult<Account>;
    async fn update_account_avatar(&self, id: AccountId, local_path: &Path) -> AppResult<Account>;
}
