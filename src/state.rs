//! Estado compartido de la aplicación
//!
//! Se pasa a través del router de Axum; el almacén se inyecta aquí y no
//! existe ninguna conexión global.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::Store;
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: EnvironmentConfig,
    pub jwt: JwtConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: EnvironmentConfig) -> Self {
        let jwt = JwtConfig::from(&config);
        Self { store, config, jwt }
    }
}
