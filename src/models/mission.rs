//! Modelo de Mission
//!
//! Mapea la tabla `mission` y define las dos máquinas de estado: el estado
//! de la misión (decisión del manager) y el estado de reembolso (finanzas).

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

use crate::models::expense::{self, ExpenseDay};
use crate::models::vehicle::VehicleStatus;

text_enum! {
    /// Estado de la misión
    MissionStatus {
        EnAttente => "En attente",
        Validee => "Validée",
        Refusee => "Refusée",
    }
}

impl MissionStatus {
    /// Estado que debe tomar el vehículo de servicio tras la decisión
    pub fn vehicle_status(&self) -> VehicleStatus {
        match self {
            MissionStatus::EnAttente => VehicleStatus::EnAttente,
            MissionStatus::Validee => VehicleStatus::EnMission,
            MissionStatus::Refusee => VehicleStatus::Disponible,
        }
    }

    /// Sólo se decide una misión en espera
    pub fn can_transition_to(&self, next: MissionStatus) -> bool {
        matches!(
            (self, next),
            (MissionStatus::EnAttente, MissionStatus::Validee)
                | (MissionStatus::EnAttente, MissionStatus::Refusee)
        )
    }
}

text_enum! {
    /// Estado del reembolso
    ReimbursementStatus {
        EnAttente => "En attente",
        Validee => "Validée",
        Refusee => "Refusée",
        Paye => "Payé",
    }
}

impl ReimbursementStatus {
    /// Estados visibles en el historial de finanzas
    pub const SETTLED: &'static [ReimbursementStatus] = &[
        ReimbursementStatus::Validee,
        ReimbursementStatus::Refusee,
        ReimbursementStatus::Paye,
    ];

    /// `En attente → Validée → Payé`, `En attente → Refusée`. Repetir el
    /// estado actual se acepta sin cambios.
    pub fn can_transition_to(&self, next: ReimbursementStatus) -> bool {
        use ReimbursementStatus::*;
        *self == next
            || matches!(
                (self, next),
                (EnAttente, Validee) | (EnAttente, Refusee) | (Validee, Paye)
            )
    }
}

text_enum! {
    /// Medio de transporte declarado en la solicitud
    TransportMode {
        MoyenPublique => "moyen publique",
        VoitureService => "voiture de service",
        VoiturePersonnelle => "voiture personnelle",
    }
}

/// Mission principal - mapea exactamente a la tabla mission
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Mission {
    pub id: String,
    pub user_id: String,
    pub vehicule_id: Option<String>,
    pub date_mission: NaiveDate,
    pub date_sortie: NaiveDate,
    pub heure_sortie: NaiveTime,
    pub date_retour: NaiveDate,
    pub heure_retour: NaiveTime,
    pub depart: String,
    pub destination: String,
    pub objet: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub frais_de_mission: Decimal,
    pub statut: MissionStatus,
    pub statut_remb: ReimbursementStatus,
    pub compteur_depart: Option<i32>,
    pub compteur_arrivee: Option<i32>,
    pub detail_frais: Option<Value>,
    pub vehicule: TransportMode,
    pub immatriculation: Option<String>,
    pub departement: String,
}

impl Mission {
    /// Vehículo acoplado al ciclo de vida, si lo hay
    pub fn service_vehicle(&self) -> Option<&str> {
        match self.vehicule {
            TransportMode::VoitureService => self.vehicule_id.as_deref(),
            _ => None,
        }
    }

    /// Ya se registró un retorno: el vehículo se liberó entonces
    pub fn return_recorded(&self) -> bool {
        self.detail_frais.is_some() || self.compteur_arrivee.is_some()
    }

    pub fn expense_days(&self) -> Vec<ExpenseDay> {
        expense::parse_detail(&self.id, self.detail_frais.as_ref())
    }
}

/// Misión con los datos de su propietario (vistas de manager y finanzas)
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MissionWithOwner {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub mission: Mission,
    pub employee: String,
    pub department: String,
}
