use axum::{extract::State, routing::get, Extension, Json, Router};

use crate::middleware::auth::AuthenticatedUser;
use crate::models::vehicle::Vehicle;
use crate::services::MissionQueryService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn vehicle_routes() -> Router<AppState> {
    Router::new().route("/disponibles", get(available_vehicles))
}

async fn available_vehicles(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Vehicle>>, AppError> {
    let service = MissionQueryService::new(state.store.clone());
    Ok(Json(service.available_vehicles(&user).await?))
}
