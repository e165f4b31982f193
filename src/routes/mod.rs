//! Router de la API
//!
//! `/health` y `/api/login` son públicos; todo lo demás pasa por el
//! middleware JWT.

use axum::{middleware::from_fn_with_state, response::Json, routing::get, Router};
use serde_json::json;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::middleware::{auth_middleware, cors_layer};
use crate::state::AppState;

pub mod auth_routes;
pub mod backoffice_routes;
pub mod finance_routes;
pub mod manager_routes;
pub mod mission_routes;
pub mod vehicle_routes;

pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/missions", mission_routes::mission_routes())
        .nest("/manager", manager_routes::manager_routes())
        .nest("/financial", finance_routes::finance_routes())
        .nest("/vehicules", vehicle_routes::vehicle_routes())
        .nest("/backoffice", backoffice_routes::backoffice_routes())
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(health))
        .nest("/api", auth_routes::auth_routes().merge(protected))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
