//! Ciclo de vida de las misiones
//!
//! Cada operación abre una transacción, valida y aplica sus cambios con
//! actualizaciones condicionales, y confirma al final. Cualquier `?` antes
//! del `commit()` descarta la transacción y con ella todos los cambios.
//!
//! Acoplamiento con el vehículo de servicio:
//!
//! | Evento                  | Misión       | Vehículo                     |
//! |-------------------------|--------------|------------------------------|
//! | creación                | `En attente` | `Disponible → En attente`    |
//! | validación del manager  | `Validée`    | `En attente → En mission`    |
//! | rechazo del manager     | `Refusée`    | `En attente → Disponible`    |
//! | retorno registrado      | sin cambio   | `En mission → Disponible`    |

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::dto::mission_dto::{CreateMissionRequest, MissionReturnRequest};
use crate::middleware::auth::{require_role, AuthenticatedUser};
use crate::models::{
    expense::ExpenseDay,
    mission::{Mission, MissionStatus, ReimbursementStatus, TransportMode},
    user::UserRole,
    vehicle::VehicleStatus,
};
use crate::repositories::{MissionStore, MissionTx, Store};
use crate::utils::errors::{
    bad_request_error, forbidden_error, not_found_error, validation_error, AppError, AppResult,
};
use crate::utils::validation::{field_error, optional_amount, optional_count, required, required_date, required_time};

pub struct MissionLifecycleService {
    store: Arc<dyn Store>,
}

impl MissionLifecycleService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Crear una misión `En attente` y reservar el vehículo de servicio
    pub async fn create_mission(&self, caller: &AuthenticatedUser, request: CreateMissionRequest) -> AppResult<String> {
        require_role(caller, &[UserRole::Employe, UserRole::Manager, UserRole::Admin])?;
        request.validate()?;

        let user_id = required("userId", &request.user_id)?;
        if caller.role != UserRole::Admin && !caller.is(user_id) {
            return Err(forbidden_error(
                "créer la mission",
                "une demande ne peut être soumise que pour soi-même",
            ));
        }

        let date_mission = required_date("dateMission", &request.date_mission)?;
        let date_sortie = required_date("dateDepart", &request.date_depart)?;
        let heure_sortie = required_time("heureDepart", &request.heure_depart)?;
        let date_retour = required_date("dateRetour", &request.date_retour)?;
        let heure_retour = required_time("heureRetour", &request.heure_retour)?;
        if (date_retour, heure_retour) < (date_sortie, heure_sortie) {
            return Err(validation_error("dateRetour", "Le retour précède le départ"));
        }

        let vehicule = required("vehicule", &request.vehicule)?;
        let vehicule = TransportMode::from_str(vehicule)
            .ok_or_else(|| field_error("vehicule", ValidationError::new("transport_mode")))?;

        let (vehicule_id, immatriculation) = match vehicule {
            TransportMode::VoitureService => (
                Some(required("vehicleId", &request.vehicle_id)?.to_string()),
                Some(required("immatriculation", &request.immatriculation)?.to_string()),
            ),
            _ => (None, None),
        };

        let mission = Mission {
            id: format!("ms-{}", Uuid::new_v4().simple()),
            user_id: user_id.to_string(),
            vehicule_id,
            date_mission,
            date_sortie,
            heure_sortie,
            date_retour,
            heure_retour,
            depart: required("depart", &request.depart)?.to_string(),
            destination: required("destination", &request.destination)?.to_string(),
            objet: required("objet", &request.objet)?.to_string(),
            frais_de_mission: optional_amount("fraisMission", &request.frais_mission)?.unwrap_or(Decimal::ZERO),
            statut: MissionStatus::EnAttente,
            statut_remb: ReimbursementStatus::EnAttente,
            compteur_depart: None,
            compteur_arrivee: None,
            detail_frais: None,
            vehicule,
            immatriculation,
            departement: required("departement", &request.departement)?.to_string(),
        };

        let mut tx = self.store.begin().await?;

        if tx.find_user(&mission.user_id).await?.is_none() {
            return Err(not_found_error("Employé", &mission.user_id));
        }

        tx.insert_mission(&mission).await?;

        if let Some(vehicle_id) = mission.service_vehicle() {
            let moved = tx
                .transition_vehicle(vehicle_id, VehicleStatus::Disponible, VehicleStatus::EnAttente)
                .await?;
            if moved == 0 {
                return Err(vehicle_unavailable(tx.as_mut(), vehicle_id).await);
            }
        }

        tx.commit().await?;
        log::info!("✅ Mission {} creada para {} ({})", mission.id, mission.user_id, mission.vehicule);

        Ok(mission.id)
    }

    /// Decisión del manager sobre una misión en espera
    pub async fn set_mission_status(
        &self,
        caller: &AuthenticatedUser,
        mission_id: &str,
        statut: &str,
    ) -> AppResult<MissionStatus> {
        require_role(caller, &[UserRole::Manager, UserRole::Admin])?;

        let target = MissionStatus::from_str(statut)
            .filter(|s| *s != MissionStatus::EnAttente)
            .ok_or_else(|| validation_error("statut", "Le statut doit être 'Validée' ou 'Refusée'"))?;

        let mut tx = self.store.begin().await?;

        let mission = tx
            .find_mission(mission_id)
            .await?
            .ok_or_else(|| not_found_error("Mission", mission_id))?;

        let owner = tx
            .find_user(&mission.user_id)
            .await?
            .ok_or_else(|| not_found_error("Employé", &mission.user_id))?;

        if caller.role != UserRole::Admin && !owner.reports_to(&caller.user_id) {
            return Err(forbidden_error(
                "décider de la mission",
                "l'employé ne fait pas partie de votre équipe",
            ));
        }

        if !mission.statut.can_transition_to(target) {
            return Err(AppError::NotFound(format!(
                "Mission '{}' n'est pas en attente (statut actuel: {})",
                mission_id, mission.statut
            )));
        }

        let updated = tx
            .update_mission_status(mission_id, MissionStatus::EnAttente, target)
            .await?;
        if updated == 0 {
            return Err(AppError::Conflict(format!(
                "Mission '{}' modifiée entre-temps, veuillez réessayer",
                mission_id
            )));
        }

        if let Some(vehicle_id) = mission.service_vehicle() {
            let moved = tx
                .transition_vehicle(vehicle_id, VehicleStatus::EnAttente, target.vehicle_status())
                .await?;
            if moved == 0 {
                return Err(AppError::Conflict(format!(
                    "Le véhicule '{}' n'est plus réservé pour cette mission",
                    vehicle_id
                )));
            }
        }

        tx.commit().await?;
        log::info!("✅ Mission {} → {} (manager {})", mission_id, target, caller.user_id);

        Ok(target)
    }

    /// Retorno de misión: contadores, detalle de gastos y liberación del vehículo
    pub async fn record_mission_return(&self, caller: &AuthenticatedUser, request: MissionReturnRequest) -> AppResult<()> {
        let user_id = required("userId", &request.user_id)?;
        let date_mission = required_date("dateMission", &request.date_mission)?;

        if !caller.is(user_id) {
            return Err(forbidden_error(
                "enregistrer le retour",
                "la mission appartient à un autre employé",
            ));
        }

        let compteur_depart = optional_count("compteurDepart", &request.compteur_depart)?;
        let compteur_arrivee = optional_count("compteurArrive", &request.compteur_arrive)?;
        if let (Some(start), Some(end)) = (compteur_depart, compteur_arrivee) {
            if end < start {
                return Err(validation_error(
                    "compteurArrive",
                    "Le compteur d'arrivée est inférieur au compteur de départ",
                ));
            }
        }

        if !request.detail_frais.iter().all(ExpenseDay::has_valid_date) {
            return Err(validation_error("detail_frais", "La date d'une journée doit être une chaîne"));
        }

        let detail = serde_json::to_value(&request.detail_frais)
            .map_err(|e| AppError::Internal(format!("Error serializando detail_frais: {}", e)))?;

        let mut tx = self.store.begin().await?;

        let mission = tx
            .find_validated_mission(user_id, date_mission)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Aucune mission validée pour '{}' à la date {}",
                    user_id, date_mission
                ))
            })?;

        if mission.statut_remb == ReimbursementStatus::Paye {
            return Err(bad_request_error("Mission déjà remboursée, le retour ne peut plus être modifié"));
        }

        // Una corrección no vuelve a tocar el vehículo: puede estar ya en otra misión
        let first_return = !mission.return_recorded();

        let updated = tx
            .record_return(&mission.id, compteur_depart, compteur_arrivee, &detail)
            .await?;
        if updated == 0 {
            return Err(AppError::Conflict(format!(
                "Mission '{}' modifiée entre-temps, veuillez réessayer",
                mission.id
            )));
        }

        if let Some(vehicle_id) = mission.service_vehicle().filter(|_| first_return) {
            let moved = tx
                .transition_vehicle(vehicle_id, VehicleStatus::EnMission, VehicleStatus::Disponible)
                .await?;
            if moved == 0 {
                log::warn!(
                    "⚠️ Vehículo {} no está En mission al registrar el retorno de {}; sin cambios",
                    vehicle_id,
                    mission.id
                );
            }
        }

        tx.commit().await?;
        log::info!(
            "✅ Retorno registrado para {} ({} días de gastos)",
            mission.id,
            request.detail_frais.len()
        );

        Ok(())
    }

    /// Avance del reembolso por finanzas; repetir el estado actual no cambia nada
    pub async fn set_reimbursement_status(
        &self,
        caller: &AuthenticatedUser,
        mission_id: &str,
        statut_remb: &str,
    ) -> AppResult<ReimbursementStatus> {
        require_role(caller, &[UserRole::Financier])?;

        let target = ReimbursementStatus::from_str(statut_remb)
            .ok_or_else(|| validation_error("statut_remb", "Statut de remboursement invalide"))?;

        let mut tx = self.store.begin().await?;

        let mission = tx
            .find_mission(mission_id)
            .await?
            .ok_or_else(|| not_found_error("Mission", mission_id))?;

        if mission.statut != MissionStatus::Validee {
            return Err(AppError::NotFound(format!(
                "Mission '{}' non validée (statut actuel: {})",
                mission_id, mission.statut
            )));
        }

        if !mission.statut_remb.can_transition_to(target) {
            return Err(bad_request_error(&format!(
                "Transition de remboursement interdite: {} → {}",
                mission.statut_remb, target
            )));
        }

        let updated = tx
            .update_reimbursement_status(mission_id, mission.statut_remb, target)
            .await?;
        if updated == 0 {
            return Err(AppError::Conflict(format!(
                "Mission '{}' modifiée entre-temps, veuillez réessayer",
                mission_id
            )));
        }

        tx.commit().await?;
        log::info!("💶 Reembolso de {}: {} → {}", mission_id, mission.statut_remb, target);

        Ok(target)
    }
}

/// Error para una reserva de vehículo fallida: inexistente o ya comprometido
async fn vehicle_unavailable(tx: &mut dyn MissionTx, vehicle_id: &str) -> AppError {
    match tx.vehicle_status(vehicle_id).await {
        Ok(None) => not_found_error("Véhicule", vehicle_id),
        Ok(Some(statut)) if statut.is_engaged() => AppError::Conflict(format!(
            "Le véhicule '{}' est déjà réservé pour une autre mission (statut: {})",
            vehicle_id, statut
        )),
        Ok(Some(statut)) => AppError::Conflict(format!(
            "Le véhicule '{}' n'est pas disponible (statut: {})",
            vehicle_id, statut
        )),
        Err(e) => e,
    }
}
