use crate::account::AccountId;
use crate::provider::Provider;

/// Observable outcomes of reconciliation and account edits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountEvent {
    LinkedByEmail {
        account_id: AccountId,
        provider: Provider,
    },
    MatchedByExternalId {
        account_id: AccountId,
        provider: Provider,
    },
    MatchedByEmail {
        account_id: AccountId,
        provider: Provider,
    },
    LinkSkipped {
        account_id: AccountId,
        provider: Provider,
    },
    AccountCreated {
        account_id: AccountId,
        provider: Provider,
    },
    AccountUpdated {
        account_id: AccountId,
    },
    AvatarReplaced {
        account_id: AccountId,
    },
}

impl AccountEvent {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            AccountEvent::LinkedByEmail { .. } => "linked_by_email",
            AccountEvent::MatchedByExternalId { .. } => "matched_by_external_id",
            AccountEvent::MatchedByEmail { .. } => "matched_by_email",
            AccountEvent::LinkSkipped { .. } => "link_skipped",
            AccountEvent::AccountCreated { .. } => "account_created",
            AccountEvent::AccountUpdated { .. } => "account_updated",
            AccountEvent::AvatarReplaced { .. } => "avatar_replaced",
        }
    }

    #[must_use]
    pub fn account_id(&self) -> AccountId {
        match self {
            AccountEvent::LinkedByEmail { account_id, .. }
            | AccountEvent::MatchedByExternalId { account_id, .. }
            | AccountEvent::MatchedByEmail { account_id, .. }
            | AccountEvent::LinkSkipped { account_id, .. }
            | AccountEvent::AccountCreated { account_id, .. }
            | AccountEvent::AccountUpdated { account_id }
            | AccountEvent::AvatarReplaced { account_id } => *account_id,
        }
    }

    #[must_use]
    pub fn provider(&self) -> Option<Provider> {
        match self {
            AccountEvent::LinkedByEmail { provider, .. }
            | AccountEvent::MatchedByExternalId { provider, .. }
            | AccountEvent::MatchedByEmail { provider, .. }
            | AccountEvent::LinkSkipped { provider, .. }
            | AccountEvent::AccountCreated { provider, .. } => Some(*provider),
            AccountEvent::AccountUpdated { .. } | AccountEvent::AvatarReplaced { .. } => None,
        }
    }
}
