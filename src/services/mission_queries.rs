//! Vistas de lectura por rol
//!
//! Cada consulta comprueba de nuevo el rol y el alcance del usuario, además
//! de la ruta por la que llega.

use std::sync::Arc;

use validator::ValidationError;

use crate::dto::mission_dto::{FinancialMissionEntry, MissionDatesResponse};
use crate::dto::vehicle_dto::VehicleFilters;
use crate::middleware::auth::{require_role, AuthenticatedUser};
use crate::models::{
    mission::{Mission, MissionStatus, MissionWithOwner, ReimbursementStatus},
    user::UserRole,
    vehicle::{Vehicle, VehicleQuery, VehicleStatus},
};
use crate::repositories::{MissionStore, Store, UserStore, VehicleStore};
use crate::utils::errors::{forbidden_error, not_found_error, validation_error, AppError, AppResult};
use crate::utils::validation::{field_error, required, required_date};

pub struct MissionQueryService {
    store: Arc<dyn Store>,
}

impl MissionQueryService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Misiones de un usuario: él mismo, un admin o su manager directo
    pub async fn missions_for_user(&self, caller: &AuthenticatedUser, user_id: &Option<String>) -> AppResult<Vec<Mission>> {
        let user_id = required("userId", user_id)?;

        if !caller.is(user_id) && caller.role != UserRole::Admin {
            let owner = self
                .store
                .find_user(user_id)
                .await?
                .ok_or_else(|| not_found_error("Employé", user_id))?;

            if caller.role != UserRole::Manager || !owner.reports_to(&caller.user_id) {
                return Err(forbidden_error(
                    "consulter les missions",
                    "l'employé ne fait pas partie de votre équipe",
                ));
            }
        }

        self.store.missions_for_user(user_id).await
    }

    /// Misiones en espera del equipo de un manager
    pub async fn pending_missions(
        &self,
        caller: &AuthenticatedUser,
        manager_id: &Option<String>,
    ) -> AppResult<Vec<MissionWithOwner>> {
        require_role(caller, &[UserRole::Manager, UserRole::Admin])?;
        let manager_id = required("managerId", manager_id)?;

        if caller.role != UserRole::Admin && !caller.is(manager_id) {
            return Err(forbidden_error(
                "consulter les demandes",
                "seules les demandes de votre équipe sont visibles",
            ));
        }

        self.store.pending_missions_for_manager(manager_id).await
    }

    /// Cola de finanzas: misiones validadas con reembolso en espera
    pub async fn reimbursement_queue(&self, caller: &AuthenticatedUser) -> AppResult<Vec<FinancialMissionEntry>> {
        require_role(caller, &[UserRole::Financier])?;

        let rows = self
            .store
            .missions_by_reimbursement(&[ReimbursementStatus::EnAttente], Some(MissionStatus::Validee))
            .await?;

        Ok(rows.into_iter().map(FinancialMissionEntry::from).collect())
    }

    /// Historial de finanzas con total general y diferencia
    pub async fn reimbursement_history(&self, caller: &AuthenticatedUser) -> AppResult<Vec<FinancialMissionEntry>> {
        require_role(caller, &[UserRole::Financier])?;

        let rows = self
            .store
            .missions_by_reimbursement(ReimbursementStatus::SETTLED, None)
            .await?;

        Ok(rows.into_iter().map(FinancialMissionEntry::from).collect())
    }

    pub async fn available_vehicles(&self, _caller: &AuthenticatedUser) -> AppResult<Vec<Vehicle>> {
        self.store.list_vehicles(&VehicleQuery::available()).await
    }

    /// Horario de la misión validada de un usuario para una fecha
    pub async fn mission_dates(
        &self,
        caller: &AuthenticatedUser,
        user_id: &Option<String>,
        date_mission: &Option<String>,
    ) -> AppResult<MissionDatesResponse> {
        let user_id = required("userId", user_id)?;
        let date_mission = required_date("dateMission", date_mission)?;

        if !caller.is(user_id) {
            return Err(forbidden_error(
                "consulter la mission",
                "la mission appartient à un autre employé",
            ));
        }

        let mission = self
            .store
            .find_validated_mission(user_id, date_mission)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Aucune mission validée pour '{}' à la date {}",
                    user_id, date_mission
                ))
            })?;

        Ok(MissionDatesResponse {
            date_sortie: mission.date_sortie,
            heure_sortie: mission.heure_sortie,
            date_retour: mission.date_retour,
            heure_retour: mission.heure_retour,
            vehicule: mission.vehicule,
        })
    }

    /// Parque automóvil filtrado (admin)
    pub async fn fleet(&self, caller: &AuthenticatedUser, filters: VehicleFilters) -> AppResult<Vec<Vehicle>> {
        require_role(caller, &[UserRole::Admin])?;

        let statut = match filters.statut.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(
                VehicleStatus::from_str(raw)
                    .ok_or_else(|| field_error("statut", ValidationError::new("vehicle_status")))?,
            ),
            None => None,
        };

        if let (Some(min), Some(max)) = (filters.min_puissance, filters.max_puissance) {
            if min > max {
                return Err(validation_error("min_puissance", "La puissance minimale dépasse la maximale"));
            }
        }

        let query = VehicleQuery {
            statut,
            marque: filters.marque.filter(|m| !m.trim().is_empty()),
            min_puissance: filters.min_puissance,
            max_puissance: filters.max_puissance,
        };

        self.store.list_vehicles(&query).await
    }
}
