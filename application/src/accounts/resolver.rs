use crate::error::{AppError, AppResult};
use crate::ports::outgoing::account_store::DynAccountStorePort;
use domain::{
    account::{Account, LinkOutcome},
    profile::CanonicalProfile,
    provider::Provider,
};

/// Outcome of reconciling a sign-in against stored accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Match {
    FoundByEmail(Account),
    FoundByExternalId(Account),
    NotFound,
}

pub struct IdentityResolver {
    account_store: DynAccountStorePort,
}

impl IdentityResolver {
    pub fn new(account_store: DynAccountStorePort) -> Self {
        Self { account_store }
    }

    /// Email is checked before the provider's external id; the first hit wins.
    pub async fn resolve(
        &self,
        provider: Provider,
        profile: &CanonicalProfile,
    ) -> AppResult<Match> {
        if let Some(account) = self.account_store.find_by_email(&profile.email).await? {
            return Ok(Match::FoundByEmail(account));
        }

        if let Some(account) = self
            .account_store
            .find_by_external_id(provider, &profile.external_id)
            .await?
        {
            return Ok(Match::FoundByExternalId(account));
        }

        Ok(Match::NotFound)
    }

    /// Records the provider's external id on an account found by email.
    ///
    /// Only an empty slot is written, and only that column. If storage
    /// reports that another account already holds the id, the account is
    /// returned unlinked.
    pub async fn link(
        &self,
        provider: Provider,
        profile: &CanonicalProfile,
        account: Account,
    ) -> AppResult<(Account, LinkOutcome)> {
        let external_id = profile.external_id.as_str();
        match account.external_id(provider) {
            Some(existing) if existing == external_id => {
                return Ok((account, LinkOutcome::AlreadyLinked));
            }
            Some(_) => return Ok((account, LinkOutcome::Conflicting)),
            None => {}
        }

        match self
            .account_store
            .link_external_id(&account.id, provider, external_id)
            .await
        {
            // The slot may have been filled since the account was read.
            Ok(stored) => {
                let outcome = match stored.external_id(provider) {
                    Some(linked) if linked == external_id => LinkOutcome::Linked,
                    _ => LinkOutcome::Conflicting,
                };
                Ok((stored, outcome))
            }
            Err(AppError::Conflict { .. }) => Ok((account, LinkOutcome::Conflicting)),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::accounts::test_support::{FakeAccountStore, existing_account, profile};

    #[tokio::test]
    async fn email_match_takes_priority_over_external_id() {
        let by_email = existing_account("a@x.com", None);
        let by_external_id = existing_account("b@x.com", Some("g1"));
        let store = Arc::new(FakeAccountStore::with_accounts(vec![
            by_email.clone(),
            by_external_id,
        ]));
        let resolver = IdentityResolver::new(store);

        let resolution = resolver
            .resolve(Provider::Google, &profile("g1", "a@x.com"))
            .await
            .unwrap();

        assert_eq!(resolution, Match::FoundByEmail(by_email));
    }

    #[tokio::test]
    async fn external_id_is_the_fallback() {
        let linked = existing_account("old@x.com", Some("g1"));
        let store = Arc::new(FakeAccountStore::with_accounts(vec![linked.clone()]));
        let resolver = IdentityResolver::new(Arc::clone(&store) as DynAccountStorePort);

        let resolution = resolver
            .resolve(Provider::Google, &profile("g1", "changed@x.com"))
            .await
            .unwrap();

        assert_eq!(resolution, Match::FoundByExternalId(linked));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn external_id_lookup_is_scoped_to_the_provider() {
        let store = Arc::new(FakeAccountStore::with_accounts(vec![existing_account(
            "old@x.com",
            Some("g1"),
        )]));
        let resolver = IdentityResolver::new(store);

        let resolution = resolver
            .resolve(Provider::Facebook, &profile("g1", "someone@x.com"))
            .await
            .unwrap();

        assert_eq!(resolution, Match::NotFound);
    }

    #[tokio::test]
    async fn linking_persists_only_when_the_slot_was_empty() {
        let account = existing_account("a@x.com", None);
        let store = Arc::new(FakeAccountStore::with_accounts(vec![account.clone()]));
        let resolver = IdentityResolver::new(Arc::clone(&store) as DynAccountStorePort);
        let incoming = profile("g1", "a@x.com");

        let (linked, outcome) = resolver
            .link(Provider::Google, &incoming, account)
            .await
            .unwrap();
        assert_eq!(outcome, LinkOutcome::Linked);
        assert_eq!(linked.google_external_id.as_deref(), Some("g1"));

        let (again, outcome) = resolver
            .link(Provider::Google, &incoming, linked.clone())
            .await
            .unwrap();
        assert_eq!(outcome, LinkOutcome::AlreadyLinked);
        assert_eq!(again, linked);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn link_is_skipped_when_another_account_owns_the_external_id() {
        let by_email = existing_account("a@x.com", None);
        let owner = existing_account("b@x.com", Some("g1"));
        let store = Arc::new(FakeAccountStore::with_accounts(vec![
            by_email.clone(),
            owner,
        ]));
        let resolver = IdentityResolver::new(Arc::clone(&store) as DynAccountStorePort);

        let (account, outcome) = resolver
            .link(Provider::Google, &profile("g1", "a@x.com"), by_email.clone())
            .await
            .unwrap();

        assert_eq!(outcome, LinkOutcome::Conflicting);
        assert_eq!(account, by_email);
        assert_eq!(
            store.stored(&by_email.id).unwrap().google_external_id,
            None
        );
    }

    #[tokio::test]
    async fn link_does_not_replace_an_id_stored_since_the_read() {
        let stale = existing_account("a@x.com", None);
        let mut current = stale.clone();
        current.google_external_id = Some("g-other".to_string());
        let store = Arc::new(FakeAccountStore::with_accounts(vec![current.clone()]));
        let resolver = IdentityResolver::new(Arc::clone(&store) as DynAccountStorePort);

        let (account, outcome) = resolver
            .link(Provider::Google, &profile("g1", "a@x.com"), stale)
            .await
            .unwrap();

        assert_eq!(outcome, LinkOutcome::Conflicting);
        assert_eq!(account, current);
        assert_eq!(store.stored(&current.id), Some(current));
    }
}
