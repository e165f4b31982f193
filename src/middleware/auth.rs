//! Middleware de autenticación JWT
//!
//! Extrae el token, lo verifica, relee el usuario y deja un
//! [`AuthenticatedUser`] en las extensions de la request.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::{
    models::user::UserRole,
    repositories::UserStore,
    state::AppState,
    utils::{
        errors::{AppError, AppResult},
        jwt::{extract_token_from_header, verify_token},
    },
};

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn is(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Jeton d'authentification requis".to_string()))?;

    let token = extract_token_from_header(auth_header)?;
    let claims = verify_token(token, &state.jwt)?;

    // El rol del token debe seguir siendo el rol almacenado
    let user = state
        .store
        .find_user(&claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Utilisateur inconnu".to_string()))?;

    if user.role != claims.role {
        log::warn!("🔒 Rol del token ({}) distinto del almacenado ({}) para {}", claims.role, user.role, user.id);
        return Err(AppError::Unauthorized("Jeton périmé, veuillez vous reconnecter".to_string()));
    }

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: user.id,
        role: user.role,
    });

    Ok(next.run(request).await)
}

/// Verificar que el usuario tiene uno de los roles permitidos
pub fn require_role(user: &AuthenticatedUser, roles: &[UserRole]) -> AppResult<()> {
    if roles.contains(&user.role) {
        return Ok(());
    }

    Err(AppError::Unauthorized(format!(
        "Rôle '{}' non autorisé pour cette opération",
        user.role
    )))
}
