use std::sync::Arc;

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::dto::auth_dto::{LoginRequest, LoginResponse};
use crate::repositories::{Store, UserStore};
use crate::utils::errors::{validation_error, AppError, AppResult};
use crate::utils::jwt::{generate_token, JwtConfig};
use crate::utils::validation::required;

/// Mensaje único para cualquier fallo de credenciales
const INVALID_CREDENTIALS: &str = "Nom ou mot de passe invalide.";

/// Servicio de autenticación
pub struct AuthService {
    store: Arc<dyn Store>,
    jwt: JwtConfig,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, jwt: JwtConfig) -> Self {
        Self { store, jwt }
    }

    /// Login por nombre completo y contraseña
    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        let nom_et_prenom = required("nom_et_prenom", &request.nom_et_prenom)?;
        let password = request
            .mot_de_passe
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| validation_error("motDePasse", "Le mot de passe est requis"))?;

        let user = self
            .store
            .find_user_by_name(nom_et_prenom)
            .await?
            .ok_or_else(|| {
                log::warn!("🔒 Login rechazado: usuario desconocido '{}'", nom_et_prenom);
                AppError::Unauthorized(INVALID_CREDENTIALS.to_string())
            })?;

        if !verify_credential(user.mot_de_passe.as_deref(), password)? {
            log::warn!("🔒 Login rechazado para {}", user.id);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let (token, expires_at) = generate_token(&user.id, user.role, &self.jwt)?;
        log::info!("✅ Login correcto: {} ({})", user.id, user.role);

        Ok(LoginResponse {
            token,
            role: user.role,
            user_id: user.id,
            expires_at,
        })
    }
}

/// Comparar la contraseña con la credencial almacenada: hash bcrypt o
/// texto plano (cuentas creadas antes de la primera modificación de perfil)
pub fn verify_credential(stored: Option<&str>, provided: &str) -> AppResult<bool> {
    match stored {
        None => Ok(false),
        Some(stored) if stored.starts_with("$2") => {
            verify(provided, stored).map_err(|e| AppError::Hash(e.to_string()))
        }
        Some(stored) => Ok(stored == provided),
    }
}

pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST).map_err(|e| AppError::Hash(e.to_string()))
}
