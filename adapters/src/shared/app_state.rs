use std::sync::Arc;

use social_accounts_application::{
    infrastructure_config::Config,
    ports::incoming::{accounts::AccountUseCase, sign_in::SignInUseCase},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sign_in_use_case: Arc<dyn SignInUseCase + Send + Sync>,
    pub account_use_case: Arc<dyn AccountUseCase + Send + Sync>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        sign_in_use_case: Arc<dyn SignInUseCase + Send + Sync>,
        account_use_case: Arc<dyn AccountUseCase + Send + Sync>,
    ) -> Self {
        Self {
            config,
            sign_in_use_case,
            account_use_case,
        }
    }
}
