use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::{PetStore, UserStore};
use crate::middleware::RateLimiter;
use crate::services::{AuthService, PetService};

/// Shared application state: explicitly constructed store handles and the
/// services built over them. Owned for the process lifetime and cloned per
/// request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: Arc<AuthService>,
    pub pets: Arc<PetService>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(config: AppConfig, users: Arc<dyn UserStore>, pets: Arc<dyn PetStore>) -> Self {
        let limiter = RateLimiter::new(config.rate_limit.window_ms, config.rate_limit.max_attempts);
        let auth = AuthService::new(users, config.session.clone());
        let pets = PetService::new(pets);

        Self {
            config: Arc::new(config),
            auth: Arc::new(auth),
            pets: Arc::new(pets),
            limiter: Arc::new(limiter),
        }
    }
}
