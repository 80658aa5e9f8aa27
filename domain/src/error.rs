use thiserror::Error;

use crate::provider::Provider;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Malformed {provider} profile: missing or empty `{field}`")]
    MalformedProfile {
        provider: Provider,
        field: &'static str,
    },

    #[error("{provider} reports the account email as unverified")]
    UnverifiedEmail { provider: Provider },

    #[error("Expected a {expected} profile, got a {actual} profile")]
    ProviderMismatch { expected: Provider, actual: Provider },

    #[error("Unknown identity provider: {0}")]
    UnknownProvider(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
