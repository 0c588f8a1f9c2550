use std::sync::Arc;

use actix_web::web;

use crate::auth::{AuthorizationFilter, BcryptHasher, JwtService, TokenService};
use crate::config::Config;
use crate::store::{AccountStore, MemoryAccountStore, MemoryTaskStore, TaskStore};
use crate::usecases::{AccountUseCase, TaskUseCase};

/// Shared application services, registered as actix app data.
#[derive(Clone)]
pub struct AppState {
    pub accounts: web::Data<AccountUseCase>,
    pub tasks: web::Data<TaskUseCase>,
    pub filter: web::Data<AuthorizationFilter>,
}

impl AppState {
    /// Wires the use cases and the authorization filter over the given stores.
    /// A single `JwtService`, keyed from `config`, backs both issuance and
    /// verification.
    pub fn new(
        config: &Config,
        account_store: Arc<dyn AccountStore>,
        task_store: Arc<dyn TaskStore>,
    ) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtService::new(
            config.jwt_secret.as_bytes(),
            config.token_ttl_secs,
            config.token_leeway_secs,
        ));

        Self {
            accounts: web::Data::new(AccountUseCase::new(
                account_store,
                Arc::new(BcryptHasher),
                tokens.clone(),
            )),
            tasks: web::Data::new(TaskUseCase::new(task_store)),
            filter: web::Data::new(AuthorizationFilter::new(
                tokens,
                config.auth_cookie_name.clone(),
            )),
        }
    }

    pub fn in_memory(config: &Config) -> Self {
        Self::new(
            config,
            Arc::new(MemoryAccountStore::new()),
            Arc::new(MemoryTaskStore::new()),
        )
    }

    /// Registers the shared services on an app or scope.
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.accounts.clone())
            .app_data(self.tasks.clone())
            .app_data(self.filter.clone());
    }
}
