use time::OffsetDateTime;

use crate::error::{AppError, AppResult};
use crate::ports::outgoing::{
    account_store::DynAccountStorePort, avatar_pipeline::DynAvatarPipelinePort,
};
use domain::{
    account::{Account, AccountId},
    profile::CanonicalProfile,
    provider::Provider,
};

/// Creates accounts for first-time sign-ins.
///
/// The avatar is downloaded and stored under the new account's id before the
/// account row is written, so a failed ingestion persists nothing. A failed
/// insert unpublishes the stored avatar again.
pub struct AccountMaterializer {
    account_store: DynAccountStorePort,
    avatar_pipeline: DynAvatarPipelinePort,
}

impl AccountMaterializer {
    pub fn new(account_store: DynAccountStorePort, avatar_pipeline: DynAvatarPipelinePort) -> Self {
        Self {
            account_store,
            avatar_pipeline,
        }
    }

    pub async fn materialize(
        &self,
        provider: Provider,
        profile: &CanonicalProfile,
    ) -> AppResult<Account> {
        let id = AccountId::new();
        let avatar_url = self.ingest_avatar(&id, &profile.avatar_source_url).await?;

        let account = Account::from_profile(
            id,
            provider,
            profile,
            avatar_url.clone(),
            OffsetDateTime::now_utc(),
        );

        match self.account_store.insert(&account).await {
            Ok(account) => Ok(account),
            Err(e) => {
                self.avatar_pipeline.unpublish(&avatar_url).await;
                Err(e)
            }
        }
    }

    async fn ingest_avatar(&self, owner: &AccountId, source_url: &str) -> AppResult<String> {
        let local_path = self.avatar_pipeline.download_from_url(source_url).await?;
        let stored = self.avatar_pipeline.upload(owner, &local_path).await;
        self.avatar_pipeline.discard(&local_path).await;
        // A provider serving something other than an image is an upstream fault.
        stored.map_err(|e| match e {
            AppError::UnsupportedImage { message } => AppError::AvatarIngestion { message },
            other => other,
        })
    }
}
