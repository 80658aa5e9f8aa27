pub mod account_events;
pub mod account_store;
pub mod avatar_pipeline;
pub mod identity_provider;
