use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::{get, put},
    Extension, Json, Router,
};

use crate::dto::common::ApiResponse;
use crate::dto::mission_dto::{PendingMissionsQuery, UpdateMissionStatusRequest};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::mission::{MissionStatus, MissionWithOwner};
use crate::services::{MissionLifecycleService, MissionQueryService};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::required;

pub fn manager_routes() -> Router<AppState> {
    Router::new()
        .route("/pending-missions", get(pending_missions))
        .route("/missions/:id/status", put(update_mission_status))
}

async fn pending_missions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<PendingMissionsQuery>,
) -> Result<Json<Vec<MissionWithOwner>>, AppError> {
    let service = MissionQueryService::new(state.store.clone());
    let missions = service.pending_missions(&user, &query.manager_id).await?;
    Ok(Json(missions))
}

async fn update_mission_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateMissionStatusRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<MissionStatus>>, AppError> {
    let Json(request) = payload?;
    let statut = required("statut", &request.statut)?;

    let service = MissionLifecycleService::new(state.store.clone());
    let statut = service.set_mission_status(&user, &id, statut).await?;
    Ok(Json(ApiResponse::success_with_message(
        statut,
        format!("Mission {} : {}", id, statut),
    )))
}
