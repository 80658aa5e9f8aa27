use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/social_accounts";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub db: DbConfig,
    pub storage: StorageConfig,
    pub avatars: AvatarConfig,
    pub providers: ProvidersConfig,
    pub logging: LoggingConfig,
    pub environment: EnvironmentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: Option<String>,
    pub request_body_limit_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_url: SecretString,
    pub pool_size: u32,
    pub query_timeout_secs: u64,
    pub run_migrations: bool,
}

impl Serialize for DbConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("DbConfig", 4)?;
        state.serialize_field("database_url", "[REDACTED]")?;
        state.serialize_field("pool_size", &self.pool_size)?;
        state.serialize_field("query_timeout_secs", &self.query_timeout_secs)?;
        state.serialize_field("run_migrations", &self.run_migrations)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for DbConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct DbConfigHelper {
            database_url: String,
            pool_size: u32,
            query_timeout_secs: u64,
            run_migrations: bool,
        }

        let helper = DbConfigHelper::deserialize(deserializer)?;
        Ok(DbConfig {
            database_url: SecretString::from(helper.database_url),
            pool_size: helper.pool_size,
            query_timeout_secs: helper.query_timeout_secs,
            run_migrations: helper.run_migrations,
        })
    }
}

impl DbConfig {
    #[must_use]
    pub fn redacted_url(&self) -> String {
        let url_str = self.database_url.expose_secret();
        match url::Url::parse(url_str) {
            Ok(mut url) => {
                if url.password().is_some() {
                    url.set_password(Some("***")).ok();
                }
                url.to_string()
            }
            Err(_) => "[INVALID_URL]".to_string(),
        }
    }

    #[must_use]
    pub fn database_url(&self) -> &str {
        self.database_url.expose_secret()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageBackend {
    #[serde(rename = "postgres")]
    Postgres,
    #[serde(rename = "memory")]
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarConfig {
    pub storage_dir: String,
    pub public_url_prefix: String,
    pub max_download_bytes: usize,
    pub download_timeout_secs: u64,
    pub max_dimension: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    pub google: GoogleProviderConfig,
    pub facebook: FacebookProviderConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleProviderConfig {
    pub client_id: Option<String>,
    #[serde(default, with = "redacted_secret")]
    pub client_secret: Option<SecretString>,
    pub redirect_url: Option<String>,
}

impl GoogleProviderConfig {
    /// Credentials when all three settings are present and non-blank.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str, &str)> {
        let client_id = non_blank(self.client_id.as_deref())?;
        let client_secret = non_blank(self.client_secret.as_ref().map(|s| s.expose_secret()))?;
        let redirect_url = non_blank(self.redirect_url.as_deref())?;
        Some((client_id, client_secret, redirect_url))
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.credentials().is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacebookProviderConfig {
    pub app_id: Option<String>,
    #[serde(default, with = "redacted_secret")]
    pub app_secret: Option<SecretString>,
    pub graph_api_version: String,
}

impl Default for FacebookProviderConfig {
    fn default() -> Self {
        Self {
            app_id: None,
            app_secret: None,
            graph_api_version: "v19.0".to_string(),
        }
    }
}

impl FacebookProviderConfig {
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let app_id = non_blank(self.app_id.as_deref())?;
        let app_secret = non_blank(self.app_secret.as_ref().map(|s| s.expose_secret()))?;
        Some((app_id, app_secret))
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.credentials().is_some()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

mod redacted_secret {
    use secrecy::SecretString;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(value: &Option<SecretString>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(_) => serializer.serialize_some("[REDACTED]"),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub include_location: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LogFormat {
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "pretty")]
    Pretty,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                cors_origin: None,
                request_body_limit_bytes: 5 * 1024 * 1024,
            },
            db: DbConfig {
                database_url: SecretString::from(DEFAULT_DATABASE_URL),
                pool_size: 10,
                query_timeout_secs: 5,
                run_migrations: true,
            },
            storage: StorageConfig {
                backend: StorageBackend::Postgres,
            },
            avatars: AvatarConfig {
                storage_dir: "./media".to_string(),
                public_url_prefix: "/media".to_string(),
                max_download_bytes: 5 * 1024 * 1024,
                download_timeout_secs: 10,
                max_dimension: 512,
            },
            providers: ProvidersConfig::default(),
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                include_location: false,
            },
            environment: EnvironmentConfig {
                env: "development".to_string(),
            },
        }
    }
}

impl Config {
    pub fn validate(&self) -> AppResult<()> {
        if self.server.request_body_limit_bytes == 0 {
            return Err(AppError::ConfigError {
                message: "request_body_limit_bytes must be greater than 0".to_string(),
            });
        }

        if self.storage.backend == StorageBackend::Postgres {
            if self.db.database_url.expose_secret().is_empty() {
                return Err(AppError::ConfigError {
                    message: "database_url cannot be empty".to_string(),
                });
            }

            if self.db.pool_size == 0 {
                return Err(AppError::ConfigError {
                    message: "db pool_size must be greater than 0".to_string(),
                });
            }

            if self.db.query_timeout_secs == 0 {
                return Err(AppError::ConfigError {
                    message: "db query_timeout_secs must be greater than 0".to_string(),
                });
            }
        }

        if self.avatars.storage_dir.trim().is_empty() {
            return Err(AppError::ConfigError {
                message: "avatars storage_dir cannot be empty".to_string(),
            });
        }

        if self.avatars.max_download_bytes == 0 {
            return Err(AppError::ConfigError {
                message: "avatars max_download_bytes must be greater than 0".to_string(),
            });
        }

        if self.avatars.download_timeout_secs == 0 {
            return Err(AppError::ConfigError {
                message: "avatars download_timeout_secs must be greater than 0".to_string(),
            });
        }

        if !(16..=4096).contains(&self.avatars.max_dimension) {
            return Err(AppError::ConfigError {
                message: "avatars max_dimension must be between 16 and 4096".to_string(),
            });
        }

        if let Some(redirect_url) = non_blank(self.providers.google.redirect_url.as_deref()) {
            url::Url::parse(redirect_url).map_err(|e| AppError::ConfigError {
                message: format!("providers.google.redirect_url is not a valid URL: {e}"),
            })?;
        }

        if self.providers.facebook.graph_api_version.trim().is_empty() {
            return Err(AppError::ConfigError {
                message: "providers.facebook.graph_api_version cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    #[must_use]
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
