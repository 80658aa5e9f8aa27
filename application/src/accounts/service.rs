use std::path::Path;

use crate::error::{AppError, AppResult};
use crate::ports::incoming::accounts::AccountUseCase;
use crate::ports::outgoing::{
    account_events::DynAccountEventsPort, account_store::DynAccountStorePort,
    avatar_pipeline::DynAvatarPipelinePort,
};
use domain::{
    account::{Account, AccountId, AccountPatch},
    events::AccountEvent,
};

pub struct AccountService {
    account_store: DynAccountStorePort,
    avatar_pipeline: DynAvatarPipelinePort,
    events: DynAccountEventsPort,
}

impl AccountService {
    pub fn new(
        account_store: DynAccountStorePort,
        avatar_pipeline: DynAvatarPipelinePort,
        events: DynAccountEventsPort,
    ) -> Self {
        Self {
            account_store,
            avatar_pipeline,
            events,
        }
    }
}

#[async_trait::async_trait]
impl AccountUseCase for AccountService {
    async fn get_account(&self, id: AccountId) -> AppResult<Account> {
        self.account_store
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::NotFound {
                message: format!("Account {id} not found"),
            })
    }

    async fn update_account(&self, id: AccountId, patch: AccountPatch) -> AppResult<Account> {
        let mut account = self.get_account(id).await?;
        if patch.is_empty() {
            return Ok(account);
        }

        account.apply_patch(patch.clone());
        account.validate()?;

        let updated = self.account_store.update_attributes(&id, &patch).await?;
        self.events.emit(AccountEvent::AccountUpdated { account_id: id });
        Ok(updated)
    }

    async fn update_account_avatar(&self, id: AccountId, local_path: &Path) -> AppResult<Account> {
        self.get_account(id).await?;

        let avatar_url = self.avatar_pipeline.upload(&id, local_path).await?;

        let updated = self
            .account_store
            .update_avatar_url(&id, &avatar_url)
            .await?;
        self.events.emit(AccountEvent::AvatarReplaced { account_id: id });
        Ok(updated)
    }
}
