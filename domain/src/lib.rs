pub mod account;
pub mod error;
pub mod events;
pub mod profile;
pub mod provider;
