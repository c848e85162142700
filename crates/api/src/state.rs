use std::sync::Arc;

use infra::{RegistrationService, RegistrationStore};

use crate::auth::JwtService;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub registrations: RegistrationService,
    jwt_service: JwtService,
}

impl AppState {
    pub fn new(store: Arc<dyn RegistrationStore>, config: &AppConfig) -> Self {
        Self {
            registrations: RegistrationService::new(store, config.registration.clone()),
            jwt_service: JwtService::new(config),
        }
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }
}
