#[cfg(any(
    feature = "adapters",
    feature = "axum",
    feature = "sqlx",
    feature = "reqwest",
    feature = "image"
))]
compile_error!("application must not depend on adapters/framework crates");

pub mod accounts;
pub mod error;
pub mod infrastructure_config;
pub mod ports;
