// keep public for OpenAPI docs
pub mod accounts;
pub mod health;
pub mod sign_in;
