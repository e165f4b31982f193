use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};

use crate::dto::common::{ApiResponse, CountResponse, CreatedResponse};
use crate::dto::personnel_dto::{CreateEmployeeRequest, PersonnelFilters, UpdateProfileRequest};
use crate::dto::vehicle_dto::{CreateVehicleRequest, VehicleFilters};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{user::User, vehicle::Vehicle};
use crate::services::{BackofficeService, MissionQueryService};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn backoffice_routes() -> Router<AppState> {
    Router::new()
        .route("/vehicules", get(list_vehicles))
        .route("/vehicules", post(add_vehicle))
        .route("/vehicules/count", get(count_vehicles))
        .route("/personnel", get(list_personnel))
        .route("/personnel", post(add_employee))
        .route("/personnel/count", get(count_personnel))
        .route("/personnel/:id/profile", put(update_profile))
}

async fn list_vehicles(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(filters): Query<VehicleFilters>,
) -> Result<Json<Vec<Vehicle>>, AppError> {
    let service = MissionQueryService::new(state.store.clone());
    Ok(Json(service.fleet(&user, filters).await?))
}

async fn add_vehicle(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<CreateVehicleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let Json(request) = payload?;
    let service = BackofficeService::new(state.store.clone());
    let id = service.add_vehicle(&user, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id,
            message: "Véhicule ajouté avec succès !".to_string(),
        }),
    ))
}

async fn count_vehicles(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<CountResponse>, AppError> {
    let service = BackofficeService::new(state.store.clone());
    let count = service.count_vehicles(&user).await?;
    Ok(Json(CountResponse { count }))
}

async fn list_personnel(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(filters): Query<PersonnelFilters>,
) -> Result<Json<Vec<User>>, AppError> {
    let service = BackofficeService::new(state.store.clone());
    Ok(Json(service.list_personnel(&user, filters).await?))
}

async fn add_employee(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<CreateEmployeeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let Json(request) = payload?;
    let service = BackofficeService::new(state.store.clone());
    let id = service.add_employee(&user, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id,
            message: "Employé ajouté avec succès !".to_string(),
        }),
    ))
}

async fn count_personnel(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<CountResponse>, AppError> {
    let service = BackofficeService::new(state.store.clone());
    let count = service.count_personnel(&user).await?;
    Ok(Json(CountResponse { count }))
}

async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let Json(request) = payload?;
    let service = BackofficeService::new(state.store.clone());
    service.update_profile(&user, &id, request).await?;
    Ok(Json(ApiResponse::ok("Profil mis à jour".to_string())))
}
