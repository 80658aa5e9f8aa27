#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use time::OffsetDateTime;
use tokio::sync::Notify;

use crate::error::{AppError, AppResult};
use crate::ports::outgoing::{
    account_events::AccountEventsPort, account_store::AccountStorePort,
    avatar_pipeline::AvatarPipelinePort, identity_provider::IdentityProviderPort,
};
use domain::{
    account::{Account, AccountId, AccountPatch},
    events::AccountEvent,
    profile::{CanonicalProfile, GoogleProfile, RawProfile},
    provider::{AuthEvidence, Provider},
};

pub fn profile(external_id: &str, email: &str) -> CanonicalProfile {
    CanonicalProfile {
        external_id: external_id.to_string(),
        email: email.to_string(),
        given_name: "A".to_string(),
        family_name: "B".to_string(),
        avatar_source_url: "http://img".to_string(),
    }
}

pub fn existing_account(email: &str, google_external_id: Option<&str>) -> Account {
    Account {
        id: AccountId::new(),
        first_name: "Existing".to_string(),
        last_name: "User".to_string(),
        email: email.to_string(),
        avatar_url: Some("/media/avatars/existing.webp".to_string()),
        google_external_id: google_external_id.map(ToString::to_string),
        facebook_external_id: None,
        registration_date: OffsetDateTime::UNIX_EPOCH,
    }
}

/// Account store with the same uniqueness rules as the real backends.
#[derive(Default)]
pub struct FakeAccountStore {
    accounts: Mutex<Vec<Account>>,
    writes: Mutex<usize>,
    inserts: Mutex<usize>,
    // Committed just before the next insert, as a concurrent sign-in would.
    racer: Mutex<Option<Account>>,
}

impl FakeAccountStore {
    pub fn with_accounts(accounts: Vec<Account>) -> Self {
        Self {
            accounts: Mutex::new(accounts),
            ..Self::default()
        }
    }

    pub fn race_next_insert_with(&self, account: Account) {
        *self.racer.lock().unwrap() = Some(account);
    }

    pub fn all(&self) -> Vec<Account> {
        self.accounts.lock().unwrap().clone()
    }

    pub fn stored(&self, id: &AccountId) -> Option<Account> {
        self.all().into_iter().find(|account| &account.id == id)
    }

    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    pub fn insert_count(&self) -> usize {
        *self.inserts.lock().unwrap()
    }

    // Applies `change` to the stored row under the lock, as one statement would.
    fn write(&self, id: &AccountId, change: impl FnOnce(&mut Account)) -> AppResult<Account> {
        let mut accounts = self.accounts.lock().unwrap();
        let mut candidate = accounts
            .iter()
            .find(|existing| &existing.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound {
                message: format!("Account {id} not found"),
            })?;
        change(&mut candidate);
        if accounts.iter().any(|existing| Self::clashes(existing, &candidate)) {
            return Err(AppError::Conflict {
                message: "duplicate account".to_string(),
            });
        }
        if let Some(slot) = accounts.iter_mut().find(|existing| &existing.id == id) {
            *slot = candidate.clone();
        }
        *self.writes.lock().unwrap() += 1;
        Ok(candidate)
    }

    fn clashes(existing: &Account, candidate: &Account) -> bool {
        existing.id != candidate.id
            && (existing.email == candidate.email
                || Provider::ALL.into_iter().any(|provider| {
                    candidate.external_id(provider).is_some()
                        && existing.external_id(provider) == candidate.external_id(provider)
                }))
    }
}

#[async_trait::async_trait]
impl AccountStorePort for FakeAccountStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        Ok(self.all().into_iter().find(|account| account.email == email))
    }

    async fn find_by_external_id(
        &self,
        provider: Provider,
        external_id: &str,
    ) -> AppResult<Option<Account>> {
        Ok(self
            .all()
            .into_iter()
            .find(|account| account.external_id(provider) == Some(external_id)))
    }

    async fn find_by_id(&self, id: &AccountId) -> AppResult<Option<Account>> {
        Ok(self.stored(id))
    }

    async fn insert(&self, account: &Account) -> AppResult<Account> {
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(racer) = self.racer.lock().unwrap().take() {
            accounts.push(racer);
        }
        if accounts.iter().any(|existing| Self::clashes(existing, account)) {
            return Err(AppError::Conflict {
                message: "duplicate account".to_string(),
            });
        }
        accounts.push(account.clone());
        *self.inserts.lock().unwrap() += 1;
        Ok(account.clone())
    }

    async fn link_external_id(
        &self,
        id: &AccountId,
        provider: Provider,
        external_id: &str,
    ) -> AppResult<Account> {
        self.write(id, |account| {
            account.link_external_id(provider, external_id);
        })
    }

    async fn update_attributes(&self, id: &AccountId, patch: &AccountPatch) -> AppResult<Account> {
        self.write(id, |account| account.apply_patch(patch.clone()))
    }

    async fn update_avatar_url(&self, id: &AccountId, avatar_url: &str) -> AppResult<Account> {
        self.write(id, |account| {
            account.avatar_url = Some(avatar_url.to_string());
        })
    }
}

/// Holds an upload open until the test releases it.
#[derive(Default)]
pub struct UploadGate {
    pub started: Notify,
    pub release: Notify,
}

#[derive(Default)]
pub struct FakeAvatarPipeline {
    pub fail_download: bool,
    pub fail_upload: bool,
    pub reject_image: bool,
    gate: Option<Arc<UploadGate>>,
    downloads: Mutex<Vec<String>>,
    uploads: Mutex<Vec<(AccountId, PathBuf)>>,
    discards: Mutex<Vec<PathBuf>>,
    unpublished: Mutex<Vec<String>>,
}

impl FakeAvatarPipeline {
    pub fn failing_download() -> Self {
        Self {
            fail_download: true,
            ..Self::default()
        }
    }

    pub fn failing_upload() -> Self {
        Self {
            fail_upload: true,
            ..Self::default()
        }
    }

    pub fn rejecting_image() -> Self {
        Self {
            reject_image: true,
            ..Self::default()
        }
    }

    pub fn gated(gate: Arc<UploadGate>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<(AccountId, PathBuf)> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn discards(&self) -> Vec<PathBuf> {
        self.discards.lock().unwrap().clone()
    }

    pub fn unpublished(&self) -> Vec<String> {
        self.unpublished.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl AvatarPipelinePort for FakeAvatarPipeline {
    async fn download_from_url(&self, url: &str) -> AppResult<PathBuf> {
        if self.fail_download {
            return Err(AppError::AvatarIngestion {
                message: format!("GET {url} failed"),
            });
        }
        self.downloads.lock().unwrap().push(url.to_string());
        Ok(PathBuf::from("/tmp/avatar-download"))
    }

    async fn upload(&self, owner: &AccountId, local_path: &Path) -> AppResult<String> {
        if let Some(gate) = &self.gate {
            gate.started.notify_one();
            gate.release.notified().await;
        }
        if self.reject_image {
            return Err(AppError::UnsupportedImage {
                message: "not an image".to_string(),
            });
        }
        if self.fail_upload {
            return Err(AppError::AvatarIngestion {
                message: "storage unavailable".to_string(),
            });
        }
        let count = {
            let mut uploads = self.uploads.lock().unwrap();
            uploads.push((*owner, local_path.to_path_buf()));
            uploads.len()
        };
        Ok(format!("/media/avatars/{owner}/{count}.webp"))
    }

    async fn discard(&self, local_path: &Path) {
        self.discards.lock().unwrap().push(local_path.to_path_buf());
    }

    async fn unpublish(&self, avatar_url: &str) {
        self.unpublished.lock().unwrap().push(avatar_url.to_string());
    }
}

pub struct FakeIdentityProvider {
    provider: Provider,
    profile: Mutex<Option<RawProfile>>,
    exchanges: Mutex<usize>,
}

impl FakeIdentityProvider {
    pub fn google(profile: GoogleProfile) -> Self {
        Self {
            provider: Provider::Google,
            profile: Mutex::new(Some(RawProfile::Google(profile))),
            exchanges: Mutex::new(0),
        }
    }

    pub fn rejecting(provider: Provider) -> Self {
        Self {
            provider,
            profile: Mutex::new(None),
            exchanges: Mutex::new(0),
        }
    }

    pub fn returning(provider: Provider, profile: RawProfile) -> Self {
        Self {
            provider,
            profile: Mutex::new(Some(profile)),
            exchanges: Mutex::new(0),
        }
    }

    pub fn exchanges(&self) -> usize {
        *self.exchanges.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl IdentityProviderPort for FakeIdentityProvider {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn exchange_and_fetch_profile(&self, _evidence: &AuthEvidence) -> AppResult<RawProfile> {
        *self.exchanges.lock().unwrap() += 1;
        self.profile
            .lock()
            .unwrap()
            .clone()
            .ok_or(AppError::ProviderAuth {
                provider: self.provider,
                message: "invalid_grant".to_string(),
            })
    }
}

#[derive(Default)]
pub struct RecordingEvents {
    events: Mutex<Vec<AccountEvent>>,
}

impl RecordingEvents {
    pub fn names(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(AccountEvent::name)
            .collect()
    }
}

impl AccountEventsPort for RecordingEvents {
    fn emit(&self, event: AccountEvent) {
        self.events.lock().unwrap().push(event);
    }
}
