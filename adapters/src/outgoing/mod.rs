pub mod avatars_fs;
pub mod events_tracing;
pub mod identity_providers;
pub mod image_rs;
pub mod memory;
pub mod postgres_sqlx;
