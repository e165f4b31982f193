use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, put},
    Extension, Json, Router,
};

use crate::dto::mission_dto::{FinancialMissionEntry, ReimbursementStatusResponse, UpdateReimbursementRequest};
use crate::middleware::auth::AuthenticatedUser;
use crate::services::{MissionLifecycleService, MissionQueryService};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::required;

pub fn finance_routes() -> Router<AppState> {
    Router::new()
        .route("/queue", get(reimbursement_queue))
        .route("/mission-history", get(mission_history))
        .route("/missions/:id/status", put(update_reimbursement_status))
}

async fn reimbursement_queue(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<FinancialMissionEntry>>, AppError> {
    let service = MissionQueryService::new(state.store.clone());
    Ok(Json(service.reimbursement_queue(&user).await?))
}

async fn mission_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<FinancialMissionEntry>>, AppError> {
    let service = MissionQueryService::new(state.store.clone());
    Ok(Json(service.reimbursement_history(&user).await?))
}

async fn update_reimbursement_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateReimbursementRequest>, JsonRejection>,
) -> Result<Json<ReimbursementStatusResponse>, AppError> {
    let Json(request) = payload?;
    let statut_remb = required("statut_remb", &request.statut_remb)?;

    let service = MissionLifecycleService::new(state.store.clone());
    let new_status = service.set_reimbursement_status(&user, &id, statut_remb).await?;
    Ok(Json(ReimbursementStatusResponse {
        success: true,
        message: format!("Statut de remboursement mis à jour: {}", new_status),
        mission_id: id,
        new_status,
    }))
}
