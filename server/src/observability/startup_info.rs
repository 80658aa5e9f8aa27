use domain::provider::Provider;
use social_accounts_application::infrastructure_config::{AvatarConfig, Config, StorageBackend};
use tracing::info;

pub fn print_api_info(config: &Config) {
    print_api_documentation_info(config);
    print_configuration_info(config);
}

fn print_api_documentation_info(config: &Config) {
    let base_url = format!("http://{}", config.server_address());
    info!("📋 API Documentation:");
    info!("  📖 Swagger UI: {}/docs", base_url);
    info!("  📄 OpenAPI JSON: {}/api-docs/openapi.json", base_url);
}

fn print_configuration_info(config: &Config) {
    info!("⚙️  Configuration:");
    print_storage_configuration(config);
    print_avatar_configuration(&config.avatars);
    print_provider_configuration(config);
}

fn print_storage_configuration(config: &Config) {
    match config.storage.backend {
        StorageBackend::Postgres => info!(
            "  🗄️  Accounts: PostgreSQL at {} (pool {})",
            config.db.redacted_url(),
            config.db.pool_size
        ),
        StorageBackend::Memory => info!("  🗄️  Accounts: in-memory (not persisted)"),
    }
}

fn print_avatar_configuration(avatars: &AvatarConfig) {
    info!(
        "  🖼️  Avatars: {} published at {}/avatars (max {}px, downloads up to {} bytes)",
        avatars.storage_dir,
        avatars.public_url_prefix.trim_end_matches('/'),
        avatars.max_dimension,
        avatars.max_download_bytes
    );
}

fn print_provider_configuration(config: &Config) {
    for provider in Provider::ALL {
        let enabled = match provider {
            Provider::Google => config.providers.google.enabled(),
            Provider::Facebook => config.providers.facebook.enabled(),
        };
        info!(
            "  🔑 {} sign-in: {}",
            provider,
            if enabled { "ENABLED" } else { "DISABLED" }
        );
    }
}
