pub mod accounts;
pub mod sign_in;
