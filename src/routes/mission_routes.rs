use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};

use crate::dto::common::{ApiResponse, CreatedResponse};
use crate::dto::mission_dto::{
    CreateMissionRequest, MissionDatesQuery, MissionDatesResponse, MissionReturnRequest, UserMissionsQuery,
};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::mission::Mission;
use crate::services::{MissionLifecycleService, MissionQueryService};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Rutas del empleado (y del manager como solicitante)
pub fn mission_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_mission))
        .route("/mine", get(my_missions))
        .route("/dates", get(mission_dates))
        .route("/return", put(record_return))
}

async fn create_mission(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<CreateMissionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let Json(request) = payload?;
    let service = MissionLifecycleService::new(state.store.clone());
    let id = service.create_mission(&user, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id,
            message: "Mission ajoutée avec succès".to_string(),
        }),
    ))
}

async fn my_missions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<UserMissionsQuery>,
) -> Result<Json<Vec<Mission>>, AppError> {
    let service = MissionQueryService::new(state.store.clone());
    let missions = service.missions_for_user(&user, &query.user_id).await?;
    Ok(Json(missions))
}

async fn mission_dates(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<MissionDatesQuery>,
) -> Result<Json<MissionDatesResponse>, AppError> {
    let service = MissionQueryService::new(state.store.clone());
    let dates = service.mission_dates(&user, &query.user_id, &query.date_mission).await?;
    Ok(Json(dates))
}

async fn record_return(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<MissionReturnRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let Json(request) = payload?;
    let service = MissionLifecycleService::new(state.store.clone());
    service.record_mission_return(&user, request).await?;
    Ok(Json(ApiResponse::ok("Retour de mission enregistré".to_string())))
}
