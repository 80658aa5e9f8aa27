use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::profile::CanonicalProfile;
use crate::provider::Provider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub Uuid);

impl AccountId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub google_external_id: Option<String>,
    pub facebook_external_id: Option<String>,
    pub registration_date: OffsetDateTime,
}

/// Result of recording a provider's external id on an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Linked,
    AlreadyLinked,
    /// The account is linked to a different external id for this provider;
    /// the existing value was kept.
    Conflicting,
}

/// Named failures for the required account attributes.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountValidationError {
    #[error("first_name_required")]
    FirstNameRequired,
    #[error("last_name_required")]
    LastNameRequired,
    #[error("email_required")]
    EmailRequired,
}

impl AccountValidationError {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            AccountValidationError::FirstNameRequired => "first_name_required",
            AccountValidationError::LastNameRequired => "last_name_required",
            AccountValidationError::EmailRequired => "email_required",
        }
    }
}

/// The only attributes a direct account edit may change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl AccountPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.email.is_none()
    }
}

impl Account {
    /// Builds the account for a first sign-in. The avatar must already be
    /// stored so the account never exists without it.
    #[must_use]
    pub fn from_profile(
        id: AccountId,
        provider: Provider,
        profile: &CanonicalProfile,
        avatar_url: String,
        registration_date: OffsetDateTime,
    ) -> Self {
        let mut account = Self {
            id,
            first_name: profile.given_name.clone(),
            last_name: profile.family_name.clone(),
            email: profile.email.clone(),
            avatar_url: Some(avatar_url),
            google_external_id: None,
            facebook_external_id: None,
            registration_date,
        };
        *account.external_id_slot(provider) = Some(profile.external_id.clone());
        account
    }

    #[must_use]
    pub fn external_id(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Google => self.google_external_id.as_deref(),
            Provider::Facebook => self.facebook_external_id.as_deref(),
        }
    }

    fn external_id_slot(&mut self, provider: Provider) -> &mut Option<String> {
        match provider {
            Provider::Google => &mut self.google_external_id,
            Provider::Facebook => &mut self.facebook_external_id,
        }
    }

    /// Sets the provider's external id if the account has none yet. An id
    /// that is already set is never replaced.
    pub fn link_external_id(&mut self, provider: Provider, external_id: &str) -> LinkOutcome {
        let slot = self.external_id_slot(provider);
        match slot {
            None => {
                *slot = Some(external_id.to_string());
                LinkOutcome::Linked
            }
            Some(existing) if existing.as_str() == external_id => LinkOutcome::AlreadyLinked,
            Some(_) => LinkOutcome::Conflicting,
        }
    }

    pub fn apply_patch(&mut self, patch: AccountPatch) {
        let AccountPatch {
            first_name,
            last_name,
            email,
        } = patch;

        if let Some(first_name) = first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = last_name {
            self.last_name = last_name;
        }
        if let Some(email) = email {
            self.email = email;
        }
    }

    /// Checks required attributes in declaration order and reports the
    /// first missing one.
    pub fn validate(&self) -> Result<(), AccountValidationError> {
        if self.first_name.trim().is_empty() {
            return Err(AccountValidationError::FirstNameRequired);
        }
        if self.last_name.trim().is_empty() {
            return Err(AccountValidationError::LastNameRequired);
        }
        if self.email.trim().is_empty() {
            return Err(AccountValidationError::EmailRequired);
        }
        Ok(())
    }
}
