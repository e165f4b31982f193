mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;

use common::*;
use mission_management::dto::mission_dto::{CreateMissionRequest, MissionReturnRequest};
use mission_management::models::{
    expense::ExpenseDay,
    mission::{Mission, MissionStatus, ReimbursementStatus},
    user::UserRole,
    vehicle::VehicleStatus,
};
use mission_management::repositories::{MemoryStore, MissionStore};
use mission_management::services::{MissionLifecycleService, MissionQueryService};
use mission_management::utils::errors::AppError;

struct Fixture {
    store: Arc<MemoryStore>,
    lifecycle: MissionLifecycleService,
    queries: MissionQueryService,
}

async fn fixture() -> Fixture {
    let store = seeded_store().await;
    Fixture {
        lifecycle: MissionLifecycleService::new(store.clone()),
        queries: MissionQueryService::new(store.clone()),
        store,
    }
}

async fn mission(store: &MemoryStore, user_id: &str, id: &str) -> Mission {
    store
        .missions_for_user(user_id)
        .await
        .unwrap()
        .into_iter()
        .find(|m| m.id == id)
        .unwrap()
}

fn return_request(days: serde_json::Value) -> MissionReturnRequest {
    MissionReturnRequest {
        user_id: Some("e-1".to_string()),
        date_mission: Some(MISSION_DATE.to_string()),
        compteur_depart: Some(json!("12000")),
        compteur_arrive: Some(json!("12350")),
        detail_frais: serde_json::from_value::<Vec<ExpenseDay>>(days).unwrap(),
    }
}

/// Crear una misión con vehículo de servicio y validarla
async fn validated_service_mission(f: &Fixture) -> String {
    let id = f
        .lifecycle
        .create_mission(&caller("e-1", UserRole::Employe), service_mission_request("e-1", "vt-1", "123-TU-1001"))
        .await
        .unwrap();
    f.lifecycle
        .set_mission_status(&caller("m-1", UserRole::Manager), &id, "Validée")
        .await
        .unwrap();
    id
}

#[tokio::test]
async fn test_create_service_mission_reserves_vehicle() {
    let f = fixture().await;

    let id = f
        .lifecycle
        .create_mission(&caller("e-1", UserRole::Employe), service_mission_request("e-1", "vt-1", "123-TU-1001"))
        .await
        .unwrap();

    let created = mission(&f.store, "e-1", &id).await;
    assert!(id.starts_with("ms-"));
    assert_eq!(created.statut, MissionStatus::EnAttente);
    assert_eq!(created.statut_remb, ReimbursementStatus::EnAttente);
    assert_eq!(created.vehicule_id.as_deref(), Some("vt-1"));
    assert_eq!(created.frais_de_mission, Decimal::from(100));
    assert_eq!(vehicle_status(&f.store, "vt-1").await, VehicleStatus::EnAttente);
}

#[tokio::test]
async fn test_manager_validation_puts_vehicle_on_mission() {
    let f = fixture().await;
    let id = validated_service_mission(&f).await;

    assert_eq!(mission(&f.store, "e-1", &id).await.statut, MissionStatus::Validee);
    assert_eq!(vehicle_status(&f.store, "vt-1").await, VehicleStatus::EnMission);
}

#[tokio::test]
async fn test_manager_refusal_releases_vehicle() {
    let f = fixture().await;
    let id = f
        .lifecycle
        .create_mission(&caller("e-1", UserRole::Employe), service_mission_request("e-1", "vt-1", "123-TU-1001"))
        .await
        .unwrap();

    let statut = f
        .lifecycle
        .set_mission_status(&caller("m-1", UserRole::Manager), &id, "Refusée")
        .await
        .unwrap();

    assert_eq!(statut, MissionStatus::Refusee);
    assert_eq!(mission(&f.store, "e-1", &id).await.statut, MissionStatus::Refusee);
    assert_eq!(vehicle_status(&f.store, "vt-1").await, VehicleStatus::Disponible);
}

#[tokio::test]
async fn test_return_records_expenses_and_frees_vehicle() {
    let f = fixture().await;
    let id = validated_service_mission(&f).await;

    f.lifecycle
        .record_mission_return(
            &caller("e-1", UserRole::Employe),
            return_request(json!([{ "date": MISSION_DATE, "montantKm": "20", "repas": 18 }])),
        )
        .await
        .unwrap();

    let returned = mission(&f.store, "e-1", &id).await;
    assert_eq!(returned.compteur_depart, Some(12000));
    assert_eq!(returned.compteur_arrivee, Some(12350));
    assert_eq!(returned.statut_remb, ReimbursementStatus::EnAttente);
    assert_eq!(vehicle_status(&f.store, "vt-1").await, VehicleStatus::Disponible);

    let queue = f
        .queries
        .reimbursement_queue(&caller("f-1", UserRole::Financier))
        .await
        .unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].grand_total, Decimal::from(38));
    assert_eq!(queue[0].difference, Decimal::from(-62));
    assert_eq!(queue[0].employee, "Eya Employe");
}

#[tokio::test]
async fn test_second_return_with_vehicle_already_free_still_succeeds() {
    let f = fixture().await;
    validated_service_mission(&f).await;
    let employee = caller("e-1", UserRole::Employe);

    f.lifecycle
        .record_mission_return(&employee, return_request(json!([{ "repas": 10 }])))
        .await
        .unwrap();
    f.lifecycle
        .record_mission_return(&employee, return_request(json!([{ "repas": 12 }])))
        .await
        .unwrap();

    assert_eq!(vehicle_status(&f.store, "vt-1").await, VehicleStatus::Disponible);
}

#[tokio::test]
async fn test_reimbursement_flow_and_idempotence() {
    let f = fixture().await;
    let id = validated_service_mission(&f).await;
    let finance = caller("f-1", UserRole::Financier);

    let first = f
        .lifecycle
        .set_reimbursement_status(&finance, &id, "Validée")
        .await
        .unwrap();
    let again = f
        .lifecycle
        .set_reimbursement_status(&finance, &id, "Validée")
        .await
        .unwrap();
    assert_eq!(first, ReimbursementStatus::Validee);
    assert_eq!(again, ReimbursementStatus::Validee);
    assert_eq!(mission(&f.store, "e-1", &id).await.statut_remb, ReimbursementStatus::Validee);

    let paid = f
        .lifecycle
        .set_reimbursement_status(&finance, &id, "Payé")
        .await
        .unwrap();
    assert_eq!(paid, ReimbursementStatus::Paye);

    let backwards = f.lifecycle.set_reimbursement_status(&finance, &id, "En attente").await;
    assert!(matches!(backwards, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn test_reimbursement_requires_validated_mission() {
    let f = fixture().await;
    let id = f
        .lifecycle
        .create_mission(&caller("e-1", UserRole::Employe), public_mission_request("e-1"))
        .await
        .unwrap();
    let finance = caller("f-1", UserRole::Financier);

    let pending = f.lifecycle.set_reimbursement_status(&finance, &id, "Validée").await;
    assert!(matches!(pending, Err(AppError::NotFound(_))));

    let missing = f.lifecycle.set_reimbursement_status(&finance, "ms-inconnue", "Validée").await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let invalid = f.lifecycle.set_reimbursement_status(&finance, &id, "Remboursé").await;
    assert!(matches!(invalid, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_paid_jump_from_pending_is_rejected() {
    let f = fixture().await;
    let id = validated_service_mission(&f).await;

    let result = f
        .lifecycle
        .set_reimbursement_status(&caller("f-1", UserRole::Financier), &id, "Payé")
        .await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));
    assert_eq!(mission(&f.store, "e-1", &id).await.statut_remb, ReimbursementStatus::EnAttente);
}

#[tokio::test]
async fn test_service_vehicle_without_id_writes_nothing() {
    let f = fixture().await;
    let mut request = service_mission_request("e-1", "vt-1", "123-TU-1001");
    request.vehicle_id = None;

    let result = f
        .lifecycle
        .create_mission(&caller("e-1", UserRole::Employe), request)
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(f.store.missions_for_user("e-1").await.unwrap().is_empty());
    assert_eq!(vehicle_status(&f.store, "vt-1").await, VehicleStatus::Disponible);
}

#[tokio::test]
async fn test_unavailable_vehicle_rolls_back_mission() {
    let f = fixture().await;

    let result = f
        .lifecycle
        .create_mission(&caller("e-1", UserRole::Employe), service_mission_request("e-1", "vt-2", "123-TU-1002"))
        .await;

    assert!(matches!(&result, Err(AppError::Conflict(msg)) if msg.contains("n'est pas disponible")));
    assert!(f.store.missions_for_user("e-1").await.unwrap().is_empty());
    assert_eq!(vehicle_status(&f.store, "vt-2").await, VehicleStatus::Maintenance);
}

#[tokio::test]
async fn test_unknown_vehicle_rolls_back_mission() {
    let f = fixture().await;

    let result = f
        .lifecycle
        .create_mission(&caller("e-1", UserRole::Employe), service_mission_request("e-1", "vt-404", "000-TU-0000"))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(f.store.missions_for_user("e-1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_vehicle_cannot_be_reserved_twice() {
    let f = fixture().await;
    f.lifecycle
        .create_mission(&caller("e-1", UserRole::Employe), service_mission_request("e-1", "vt-1", "123-TU-1001"))
        .await
        .unwrap();

    let second = f
        .lifecycle
        .create_mission(&caller("e-2", UserRole::Employe), service_mission_request("e-2", "vt-1", "123-TU-1001"))
        .await;

    assert!(matches!(&second, Err(AppError::Conflict(msg)) if msg.contains("déjà réservé")));
    assert!(f.store.missions_for_user("e-2").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_decided_mission_cannot_be_decided_again() {
    let f = fixture().await;
    let id = validated_service_mission(&f).await;

    let result = f
        .lifecycle
        .set_mission_status(&caller("m-1", UserRole::Manager), &id, "Refusée")
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(vehicle_status(&f.store, "vt-1").await, VehicleStatus::EnMission);
}

#[tokio::test]
async fn test_invalid_mission_status_is_rejected() {
    let f = fixture().await;
    let id = f
        .lifecycle
        .create_mission(&caller("e-1", UserRole::Employe), public_mission_request("e-1"))
        .await
        .unwrap();

    for statut in ["En attente", "Approuvée"] {
        let result = f
            .lifecycle
            .set_mission_status(&caller("m-1", UserRole::Manager), &id, statut)
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}

#[tokio::test]
async fn test_manager_of_another_team_is_forbidden() {
    let f = fixture().await;
    let id = f
        .lifecycle
        .create_mission(&caller("e-1", UserRole::Employe), service_mission_request("e-1", "vt-1", "123-TU-1001"))
        .await
        .unwrap();

    let result = f
        .lifecycle
        .set_mission_status(&caller("m-2", UserRole::Manager), &id, "Validée")
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert_eq!(mission(&f.store, "e-1", &id).await.statut, MissionStatus::EnAttente);
    assert_eq!(vehicle_status(&f.store, "vt-1").await, VehicleStatus::EnAttente);
}

#[tokio::test]
async fn test_employee_cannot_submit_for_someone_else() {
    let f = fixture().await;

    let result = f
        .lifecycle
        .create_mission(&caller("e-2", UserRole::Employe), public_mission_request("e-1"))
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn test_return_validation_errors() {
    let f = fixture().await;
    let employee = caller("e-1", UserRole::Employe);

    // Sin misión validada para esa fecha
    let not_validated = f
        .lifecycle
        .record_mission_return(&employee, return_request(json!([])))
        .await;
    assert!(matches!(not_validated, Err(AppError::NotFound(_))));

    validated_service_mission(&f).await;

    let mut backwards = return_request(json!([]));
    backwards.compteur_arrive = Some(json!(100));
    let result = f.lifecycle.record_mission_return(&employee, backwards).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(vehicle_status(&f.store, "vt-1").await, VehicleStatus::EnMission);

    let other = f
        .lifecycle
        .record_mission_return(&caller("e-2", UserRole::Employe), return_request(json!([])))
        .await;
    assert!(matches!(other, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn test_history_returns_submitted_detail() {
    let f = fixture().await;
    let id = validated_service_mission(&f).await;
    let days = json!([
        { "date": MISSION_DATE, "dep": "08:00", "arr": "19:00", "dest": "Sfax", "montantKm": "20", "repas": "18", "note": "péage" },
        { "date": "2024-05-11", "logement": 45.5, "detali": "taxi", "montantdet": "12,5" }
    ]);

    f.lifecycle
        .record_mission_return(&caller("e-1", UserRole::Employe), return_request(days.clone()))
        .await
        .unwrap();
    f.lifecycle
        .set_reimbursement_status(&caller("f-1", UserRole::Financier), &id, "Validée")
        .await
        .unwrap();

    let history = f
        .queries
        .reimbursement_history(&caller("f-1", UserRole::Financier))
        .await
        .unwrap();

    assert_eq!(history.len(), 1);
    assert_eq!(serde_json::to_value(&history[0].detail_frais).unwrap(), days);
    assert_eq!(history[0].grand_total, Decimal::new(960, 1));
    assert_eq!(history[0].difference, Decimal::new(-40, 1));
}

#[tokio::test]
async fn test_mission_dates_for_validated_mission() {
    let f = fixture().await;
    validated_service_mission(&f).await;

    let dates = f
        .queries
        .mission_dates(
            &caller("e-1", UserRole::Employe),
            &Some("e-1".to_string()),
            &Some(MISSION_DATE.to_string()),
        )
        .await
        .unwrap();

    assert_eq!(dates.date_retour, NaiveDate::from_ymd_opt(2024, 5, 11).unwrap());

    let missing = f
        .queries
        .mission_dates(
            &caller("e-1", UserRole::Employe),
            &Some("e-1".to_string()),
            &Some("2024-01-01".to_string()),
        )
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_pending_missions_are_scoped_to_team() {
    let f = fixture().await;
    f.lifecycle
        .create_mission(&caller("e-1", UserRole::Employe), public_mission_request("e-1"))
        .await
        .unwrap();
    f.lifecycle
        .create_mission(&caller("e-2", UserRole::Employe), public_mission_request("e-2"))
        .await
        .unwrap();

    let pending = f
        .queries
        .pending_missions(&caller("m-1", UserRole::Manager), &Some("m-1".to_string()))
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].mission.user_id, "e-1");
    assert_eq!(pending[0].employee, "Eya Employe");

    let other_team = f
        .queries
        .pending_missions(&caller("m-1", UserRole::Manager), &Some("m-2".to_string()))
        .await;
    assert!(matches!(other_team, Err(AppError::Forbidden(_))));

    let missing = f
        .queries
        .pending_missions(&caller("m-1", UserRole::Manager), &None)
        .await;
    assert!(matches!(missing, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_public_transport_mission_leaves_fleet_untouched() {
    let f = fixture().await;

    let id = f
        .lifecycle
        .create_mission(&caller("e-1", UserRole::Employe), public_mission_request("e-1"))
        .await
        .unwrap();

    let created = mission(&f.store, "e-1", &id).await;
    assert_eq!(created.statut, MissionStatus::EnAttente);
    assert_eq!(created.statut_remb, ReimbursementStatus::EnAttente);
    assert_eq!(created.vehicule_id, None);
    assert_eq!(created.immatriculation, None);
    assert_eq!(vehicle_status(&f.store, "vt-1").await, VehicleStatus::Disponible);
    assert_eq!(vehicle_status(&f.store, "vt-2").await, VehicleStatus::Maintenance);
    assert_eq!(vehicle_status(&f.store, "vt-3").await, VehicleStatus::Disponible);
}

#[tokio::test]
async fn test_vehicle_id_ignored_without_service_vehicle() {
    let f = fixture().await;

    for mode in ["voiture personnelle", "moyen publique"] {
        let request = CreateMissionRequest {
            vehicule: Some(mode.to_string()),
            vehicle_id: Some("vt-1".to_string()),
            immatriculation: Some("123-TU-1001".to_string()),
            ..public_mission_request("e-1")
        };

        let id = f
            .lifecycle
            .create_mission(&caller("e-1", UserRole::Employe), request)
            .await
            .unwrap();

        let created = mission(&f.store, "e-1", &id).await;
        assert_eq!(created.vehicule_id, None, "{}", mode);
        assert_eq!(created.service_vehicle(), None);
        assert_eq!(vehicle_status(&f.store, "vt-1").await, VehicleStatus::Disponible);
    }
}

#[tokio::test]
async fn test_corrected_return_leaves_rebooked_vehicle_alone() {
    let f = fixture().await;
    validated_service_mission(&f).await;
    let employee = caller("e-1", UserRole::Employe);

    f.lifecycle
        .record_mission_return(&employee, return_request(json!([{ "repas": 10 }])))
        .await
        .unwrap();
    assert_eq!(vehicle_status(&f.store, "vt-1").await, VehicleStatus::Disponible);

    // Otra misión reserva el mismo coche y queda validada
    let other = f
        .lifecycle
        .create_mission(&caller("e-2", UserRole::Employe), service_mission_request("e-2", "vt-1", "123-TU-1001"))
        .await
        .unwrap();
    f.lifecycle
        .set_mission_status(&caller("m-2", UserRole::Manager), &other, "Validée")
        .await
        .unwrap();
    assert_eq!(vehicle_status(&f.store, "vt-1").await, VehicleStatus::EnMission);

    f.lifecycle
        .record_mission_return(&employee, return_request(json!([{ "repas": 14 }])))
        .await
        .unwrap();

    assert_eq!(mission(&f.store, "e-2", &other).await.statut, MissionStatus::Validee);
    assert_eq!(vehicle_status(&f.store, "vt-1").await, VehicleStatus::EnMission);
}

#[tokio::test]
async fn test_history_keeps_null_amounts() {
    let f = fixture().await;
    let id = validated_service_mission(&f).await;
    let days = json!([{ "P_D": null, "diner": 0, "montantKm": 20, "repas": 18 }]);

    f.lifecycle
        .record_mission_return(&caller("e-1", UserRole::Employe), return_request(days.clone()))
        .await
        .unwrap();
    f.lifecycle
        .set_reimbursement_status(&caller("f-1", UserRole::Financier), &id, "Validée")
        .await
        .unwrap();

    let history = f
        .queries
        .reimbursement_history(&caller("f-1", UserRole::Financier))
        .await
        .unwrap();

    assert_eq!(serde_json::to_value(&history[0].detail_frais).unwrap(), days);
    assert_eq!(history[0].grand_total, Decimal::from(38));
}

#[tokio::test]
async fn test_return_rejects_non_text_day_date() {
    let f = fixture().await;
    let id = validated_service_mission(&f).await;

    let result = f
        .lifecycle
        .record_mission_return(
            &caller("e-1", UserRole::Employe),
            return_request(json!([{ "date": 20240510, "repas": 18 }])),
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(mission(&f.store, "e-1", &id).await.detail_frais, None);
    assert_eq!(vehicle_status(&f.store, "vt-1").await, VehicleStatus::EnMission);
}
