//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use anyhow::{anyhow, Context, Result};
use std::env;

/// Duración por defecto de la sesión: una hora
pub const DEFAULT_JWT_EXPIRATION: u64 = 3600;

/// Backend de almacenamiento
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Some(StoreBackend::Postgres),
            "memory" => Some(StoreBackend::Memory),
            _ => None,
        }
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    pub store_backend: StoreBackend,
    pub log_level: tracing::Level,
}

impl Default for EnvironmentConfig {
    /// Valores de desarrollo local
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 8010,
            host: "0.0.0.0".to_string(),
            jwt_secret: "development-only-secret".to_string(),
            jwt_expiration: DEFAULT_JWT_EXPIRATION,
            cors_origins: Vec::new(),
            store_backend: StoreBackend::Memory,
            log_level: tracing::Level::DEBUG,
        }
    }
}

impl EnvironmentConfig {
    /// Leer la configuración del entorno (previamente cargado con dotenvy)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construir la configuración desde cualquier fuente clave/valor
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());
        let is_development = environment == "development";

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) if !secret.trim().is_empty() => secret,
            _ if is_development => Self::default().jwt_secret,
            _ => return Err(anyhow!("JWT_SECRET must be set outside development")),
        };

        let port = match lookup("PORT") {
            Some(raw) => raw.parse().context("PORT must be a valid number")?,
            None => 8010,
        };

        let jwt_expiration = match lookup("JWT_EXPIRATION") {
            Some(raw) => raw.parse().context("JWT_EXPIRATION must be a valid number")?,
            None => DEFAULT_JWT_EXPIRATION,
        };

        let store_backend = match lookup("STORE_BACKEND") {
            Some(raw) => StoreBackend::from_str(&raw)
                .ok_or_else(|| anyhow!("STORE_BACKEND must be 'postgres' or 'memory'"))?,
            None => StoreBackend::Postgres,
        };

        let log_level = match lookup("LOG_LEVEL") {
            Some(raw) => raw
                .parse()
                .map_err(|_| anyhow!("LOG_LEVEL must be one of trace, debug, info, warn, error"))?,
            None => tracing::Level::INFO,
        };

        Ok(Self {
            environment,
            port,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            jwt_secret,
            jwt_expiration,
            cors_origins: lookup("CORS_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            store_backend,
            log_level,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_in_development() {
        let config = EnvironmentConfig::from_lookup(lookup_from(&[])).unwrap();
        assert!(config.is_development());
        assert_eq!(config.port, 8010);
        assert_eq!(config.jwt_expiration, 3600);
        assert_eq!(config.store_backend, StoreBackend::Postgres);
    }

    #[test]
    fn test_production_requires_jwt_secret() {
        let result = EnvironmentConfig::from_lookup(lookup_from(&[("ENVIRONMENT", "production")]));
        assert!(result.is_err());

        let config = EnvironmentConfig::from_lookup(lookup_from(&[
            ("ENVIRONMENT", "production"),
            ("JWT_SECRET", "s3cret"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
            ("STORE_BACKEND", "memory"),
        ]))
        .unwrap();
        assert!(config.is_production());
        assert_eq!(config.cors_origins.len(), 2);
        assert_eq!(config.store_backend, StoreBackend::Memory);
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        assert!(EnvironmentConfig::from_lookup(lookup_from(&[("PORT", "eighty")])).is_err());
        assert!(EnvironmentConfig::from_lookup(lookup_from(&[("STORE_BACKEND", "redis")])).is_err());
    }
}
