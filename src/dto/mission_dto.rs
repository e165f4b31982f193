use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::models::{
    expense::{self, ExpenseDay},
    mission::{MissionStatus, MissionWithOwner, ReimbursementStatus, TransportMode},
};

// Request para crear una misión (formulario "Nouvelle mission")
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMissionRequest {
    pub user_id: Option<String>,
    pub date_mission: Option<String>,
    pub date_depart: Option<String>,
    pub heure_depart: Option<String>,
    pub date_retour: Option<String>,
    pub heure_retour: Option<String>,
    #[validate(length(max = 255))]
    pub depart: Option<String>,
    #[validate(length(max = 255))]
    pub destination: Option<String>,
    #[validate(length(max = 1000))]
    pub objet: Option<String>,
    pub frais_mission: Option<Value>,
    pub vehicule: Option<String>,
    #[validate(length(max = 100))]
    pub departement: Option<String>,
    pub vehicle_id: Option<String>,
    #[validate(length(max = 20))]
    pub immatriculation: Option<String>,
}

// Request del manager para decidir una misión
#[derive(Debug, Deserialize)]
pub struct UpdateMissionStatusRequest {
    pub statut: Option<String>,
}

// Request de retorno de misión (contadores y detalle de gastos)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionReturnRequest {
    pub user_id: Option<String>,
    pub date_mission: Option<String>,
    pub compteur_depart: Option<Value>,
    pub compteur_arrive: Option<Value>,
    #[serde(default)]
    pub detail_frais: Vec<ExpenseDay>,
}

// Request de finanzas para el estado de reembolso
#[derive(Debug, Deserialize)]
pub struct UpdateReimbursementRequest {
    pub statut_remb: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReimbursementStatusResponse {
    pub success: bool,
    pub message: String,
    pub mission_id: String,
    pub new_status: ReimbursementStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMissionsQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionDatesQuery {
    pub user_id: Option<String>,
    pub date_mission: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingMissionsQuery {
    pub manager_id: Option<String>,
}

// Horario de la misión validada (formulario de retorno)
#[derive(Debug, Serialize, Deserialize)]
pub struct MissionDatesResponse {
    pub date_sortie: NaiveDate,
    pub heure_sortie: NaiveTime,
    pub date_retour: NaiveDate,
    pub heure_retour: NaiveTime,
    pub vehicule: TransportMode,
}

// Línea de la cola de reembolsos y del historial de finanzas
#[derive(Debug, Serialize)]
pub struct FinancialMissionEntry {
    pub id: String,
    pub employee: String,
    pub department: String,
    pub objet: String,
    pub destination: String,
    pub date_mission: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub advance: Decimal,
    #[serde(rename = "grandTotal", with = "rust_decimal::serde::float")]
    pub grand_total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub difference: Decimal,
    pub statut_remb: ReimbursementStatus,
    pub mission_status: MissionStatus,
    pub detail_frais: Vec<ExpenseDay>,
}

impl From<MissionWithOwner> for FinancialMissionEntry {
    fn from(row: MissionWithOwner) -> Self {
        let detail_frais = row.mission.expense_days();
        let grand_total = expense::grand_total(&detail_frais);
        let advance = row.mission.frais_de_mission;

        Self {
            id: row.mission.id,
            employee: row.employee,
            department: row.department,
            objet: row.mission.objet,
            destination: row.mission.destination,
            date_mission: row.mission.date_mission,
            advance,
            grand_total,
            difference: expense::difference(grand_total, advance),
            statut_remb: row.mission.statut_remb,
            mission_status: row.mission.statut,
            detail_frais,
        }
    }
}
