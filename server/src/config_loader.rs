use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml},
};
use social_accounts_application::error::{AppError, AppResult};
use social_accounts_application::infrastructure_config::{Config, DEFAULT_DATABASE_URL};
use std::fs;
use std::path::Path;
use tracing::info;

pub const ENV_PREFIX: &str = "SOCIAL_ACCOUNTS_";

/// Layers, lowest precedence first: built-in defaults, `config.toml`,
/// `config.json`, then `SOCIAL_ACCOUNTS_*` variables (`__` separates nested
/// keys, e.g. `SOCIAL_ACCOUNTS_PROVIDERS__GOOGLE__CLIENT_ID`).
pub fn load_config() -> AppResult<Config> {
    generate_env_template_if_missing()?;

    let config: Config = build_figment()
        .extract()
        .map_err(|e| AppError::ConfigError {
            message: format!("Failed to load configuration: {e}"),
        })?;

    config.validate()?;
    Ok(config)
}

fn build_figment() -> Figment {
    // Serialized defaults redact the database URL, so the real default is
    // layered back on before any user-supplied source.
    let mut figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Serialized::default("db.database_url", DEFAULT_DATABASE_URL));

    if Path::new("config.toml").exists() {
        figment = figment.merge(Toml::file("config.toml"));
    }

    if Path::new("config.json").exists() {
        figment = figment.merge(Json::file("config.json"));
    }

    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

fn generate_env_template_if_missing() -> AppResult<()> {
    let env_file = ".env";
    let template_file = ".env.example";

    if Path::new(env_file).exists() {
        return Ok(());
    }

    if !Path::new(template_file).exists() {
        return Ok(());
    }

    fs::copy(template_file, env_file).map_err(|e| AppError::ConfigError {
        message: format!("Failed to generate .env file from template: {e}"),
    })?;

    info!("Generated .env from template. Please configure provider credentials!");
    info!("IMPORTANT: .env contains sensitive data and is gitignored.");

    Ok(())
}
