use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};

use crate::dto::auth_dto::{LoginRequest, LoginResponse};
use crate::services::AuthService;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Configura las rutas de autenticación
pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(request) = payload?;
    let service = AuthService::new(state.store.clone(), state.jwt.clone());
    let response = service.login(request).await?;
    Ok(Json(response))
}
