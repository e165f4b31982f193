#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use serde_json::Value;
use tower::ServiceExt;

use mission_management::config::EnvironmentConfig;
use mission_management::dto::mission_dto::CreateMissionRequest;
use mission_management::middleware::AuthenticatedUser;
use mission_management::models::{
    user::{User, UserRole},
    vehicle::{Vehicle, VehicleQuery, VehicleStatus},
};
use mission_management::repositories::{MemoryStore, UserStore, VehicleStore};
use mission_management::utils::jwt::{generate_token, JwtConfig};
use mission_management::{create_router, AppState};

pub const MISSION_DATE: &str = "2024-05-10";

pub fn user(id: &str, nom: &str, role: UserRole, manager_id: Option<&str>, password: Option<&str>) -> User {
    User {
        id: id.to_string(),
        nom_et_prenom: nom.to_string(),
        departement: "Informatique".to_string(),
        email: format!("{}@example.tn", id),
        num_tel: "20123456".to_string(),
        cin: format!("0{}", id.len()),
        role,
        manager_id: manager_id.map(str::to_string),
        date_embauche: NaiveDate::from_ymd_opt(2020, 1, 15).unwrap(),
        mot_de_passe: password.map(str::to_string),
    }
}

pub fn vehicle(id: &str, plate: &str, statut: VehicleStatus) -> Vehicle {
    Vehicle {
        id: id.to_string(),
        immatriculation: plate.to_string(),
        marque: "Peugeot".to_string(),
        modele: "208".to_string(),
        puissance: 5,
        statut,
    }
}

/// Equipo de prueba: m-1 gestiona a e-1, m-2 gestiona a e-2
pub async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());

    for u in [
        user("a-1", "Amel Admin", UserRole::Admin, None, Some("admin")),
        user("m-1", "Mourad Manager", UserRole::Manager, None, Some("manager")),
        user("m-2", "Nadia Manager", UserRole::Manager, None, Some("manager2")),
        user("e-1", "Eya Employe", UserRole::Employe, Some("m-1"), Some("secret")),
        user("e-2", "Sami Employe", UserRole::Employe, Some("m-2"), Some("secret2")),
        user("f-1", "Fatma Finance", UserRole::Financier, None, Some("finance")),
    ] {
        store.insert_user(&u).await.unwrap();
    }

    for v in [
        vehicle("vt-1", "123-TU-1001", VehicleStatus::Disponible),
        vehicle("vt-2", "123-TU-1002", VehicleStatus::Maintenance),
        vehicle("vt-3", "123-TU-1003", VehicleStatus::Disponible),
    ] {
        store.insert_vehicle(&v).await.unwrap();
    }

    store
}

pub fn caller(user_id: &str, role: UserRole) -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: user_id.to_string(),
        role,
    }
}

pub async fn vehicle_status(store: &MemoryStore, id: &str) -> VehicleStatus {
    store
        .list_vehicles(&VehicleQuery::default())
        .await
        .unwrap()
        .into_iter()
        .find(|v| v.id == id)
        .map(|v| v.statut)
        .unwrap()
}

pub fn service_mission_request(user_id: &str, vehicle_id: &str, plate: &str) -> CreateMissionRequest {
    CreateMissionRequest {
        vehicule: Some("voiture de service".to_string()),
        vehicle_id: Some(vehicle_id.to_string()),
        immatriculation: Some(plate.to_string()),
        ..public_mission_request(user_id)
    }
}

pub fn public_mission_request(user_id: &str) -> CreateMissionRequest {
    CreateMissionRequest {
        user_id: Some(user_id.to_string()),
        date_mission: Some(MISSION_DATE.to_string()),
        date_depart: Some(MISSION_DATE.to_string()),
        heure_depart: Some("08:00".to_string()),
        date_retour: Some("2024-05-11".to_string()),
        heure_retour: Some("18:30".to_string()),
        depart: Some("Tunis".to_string()),
        destination: Some("Sfax".to_string()),
        objet: Some("Audit du site".to_string()),
        frais_mission: Some(Value::String("100".to_string())),
        vehicule: Some("moyen publique".to_string()),
        departement: Some("Informatique".to_string()),
        vehicle_id: None,
        immatriculation: None,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Router completo sobre el almacén en memoria
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    router: Router,
    jwt: JwtConfig,
}

impl TestApp {
    pub async fn new() -> Self {
        let store = seeded_store().await;
        let config = EnvironmentConfig::default();
        let jwt = JwtConfig::from(&config);
        let router = create_router(AppState::new(store.clone(), config));

        Self { store, router, jwt }
    }

    pub fn token(&self, user_id: &str, role: UserRole) -> String {
        generate_token(user_id, role, &self.jwt).unwrap().0
    }

    pub async fn request(&self, method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let body = match body {
            Some(value) => Body::from(serde_json::to_vec(&value).unwrap()),
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, path, token, Some(body)).await
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PUT, path, token, Some(body)).await
    }
}
