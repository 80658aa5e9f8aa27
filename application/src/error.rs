use std::io;
use thiserror::Error;

use domain::{account::AccountValidationError, error::DomainError, provider::Provider};

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{0}")]
    InvalidAccount(#[from] AccountValidationError),

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Database error: {message}")]
    DatabaseError { message: String },

    #[error("{provider} rejected the sign-in: {message}")]
    ProviderAuth { provider: Provider, message: String },

    #[error("{provider} sign-in is not configured")]
    ProviderNotConfigured { provider: Provider },

    #[error("Unsupported image: {message}")]
    UnsupportedImage { message: String },

    #[error("Avatar ingestion failed: {message}")]
    AvatarIngestion { message: String },

    #[error("External service error: {message}")]
    ExternalServiceError { message: String },
}

pub type AppResult<T> = Result<T, AppError>;
