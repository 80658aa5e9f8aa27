use sqlx::{PgPool, postgres::PgPoolOptions};
use std::sync::Arc;
use tracing::{info, warn};

use social_accounts_adapters::outgoing::{
    avatars_fs::avatar_pipeline_fs::FilesystemAvatarPipeline,
    events_tracing::account_events_tracing::TracingAccountEventsAdapter,
    identity_providers::{
        facebook_graph::FacebookIdentityAdapter, google_oauth2::GoogleIdentityAdapter,
    },
    memory::account_store_memory::InMemoryAccountStoreAdapter,
    postgres_sqlx::{account_store_postgres::PostgresAccountStoreAdapter, utils::run_migrations},
};
use social_accounts_adapters::shared::app_state::AppState as AdaptersAppState;
use social_accounts_application::error::AppError;
use social_accounts_application::infrastructure_config::{Config, StorageBackend};
use social_accounts_application::ports::outgoing::{
    account_events::DynAccountEventsPort, account_store::DynAccountStorePort,
    avatar_pipeline::DynAvatarPipelinePort, identity_provider::IdentityProviders,
};
use social_accounts_application::{
    accounts::{
        service::AccountService,
        sign_in::{SignInService, SignInServiceDeps},
    },
    ports::incoming::{accounts::AccountUseCase, sign_in::SignInUseCase},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    db_pool: Option<PgPool>,
    pub sign_in_service: Arc<SignInService>,
    pub account_service: Arc<AccountService>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self, AppError> {
        let config = Arc::new(config);

        let (account_store, db_pool) = Self::create_account_store(&config).await?;
        let identity_providers = Self::create_identity_providers(&config)?;
        let avatar_pipeline: DynAvatarPipelinePort =
            Arc::new(FilesystemAvatarPipeline::new(&config.avatars)?);
        let events: DynAccountEventsPort = Arc::new(TracingAccountEventsAdapter::new());

        let sign_in_service = Arc::new(SignInService::new(SignInServiceDeps {
            identity_providers,
            account_store: Arc::clone(&account_store),
            avatar_pipeline: Arc::clone(&avatar_pipeline),
            events: Arc::clone(&events),
        }));
        let account_service = Arc::new(AccountService::new(
            account_store,
            avatar_pipeline,
            events,
        ));

        Ok(Self {
            config,
            db_pool,
            sign_in_service,
            account_service,
        })
    }

    async fn create_account_store(
        config: &Config,
    ) -> Result<(DynAccountStorePort, Option<PgPool>), AppError> {
        match config.storage.backend {
            StorageBackend::Postgres => {
                let db_pool = Self::create_database_pool(config).await?;
                if config.db.run_migrations {
                    run_migrations(&db_pool).await?;
                    info!("Database migrations applied");
                }

                let store: DynAccountStorePort = Arc::new(PostgresAccountStoreAdapter::new(
                    db_pool.clone(),
                    config.db.query_timeout_secs,
                ));
                Ok((store, Some(db_pool)))
            }
            StorageBackend::Memory => {
                warn!("Using the in-memory account store; accounts are lost on restart");
                let store: DynAccountStorePort = Arc::new(InMemoryAccountStoreAdapter::new());
                Ok((store, None))
            }
        }
    }

    async fn create_database_pool(config: &Config) -> Result<PgPool, AppError> {
        PgPoolOptions::new()
            .max_connections(config.db.pool_size)
            .connect(config.db.database_url())
            .await
            .map_err(|e| AppError::DatabaseError {
                message: format!("Failed to connect to database: {}", e),
            })
    }

    fn create_identity_providers(config: &Config) -> Result<IdentityProviders, AppError> {
        let mut providers = IdentityProviders::new();

        match GoogleIdentityAdapter::from_config(&config.providers.google)? {
            Some(google) => providers = providers.with(Arc::new(google)),
            None => warn!("Google sign-in disabled: client credentials are not configured"),
        }

        match FacebookIdentityAdapter::from_config(&config.providers.facebook)? {
            Some(facebook) => providers = providers.with(Arc::new(facebook)),
            None => warn!("Facebook sign-in disabled: app credentials are not configured"),
        }

        Ok(providers)
    }

    pub fn db_pool(&self) -> Option<&PgPool> {
        self.db_pool.as_ref()
    }

    pub fn to_adapters_state(self) -> AdaptersAppState {
        AdaptersAppState::new(
            self.config,
            self.sign_in_service as Arc<dyn SignInUseCase + Send + Sync>,
            self.account_service as Arc<dyn AccountUseCase + Send + Sync>,
        )
    }
}
