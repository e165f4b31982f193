//! Almacén en memoria
//!
//! Misma semántica que PostgreSQL para el desarrollo local y los tests.
//! Una transacción toma el mutex durante toda su vida, trabaja sobre una
//! copia de los datos y la publica en `commit()`; si se descarta, la copia
//! se pierde, lo que equivale a un rollback.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::models::{
    mission::{Mission, MissionStatus, MissionWithOwner, ReimbursementStatus},
    user::{User, UserRole},
    vehicle::{Vehicle, VehicleQuery, VehicleStatus},
};
use crate::repositories::{MissionStore, MissionTx, UserStore, VehicleStore};
use crate::utils::errors::{conflict_error, AppResult};

#[derive(Debug, Clone, Default)]
struct MemoryData {
    users: BTreeMap<String, User>,
    vehicles: BTreeMap<String, Vehicle>,
    missions: BTreeMap<String, Mission>,
}

impl MemoryData {
    fn with_owner(&self, mission: &Mission) -> Option<MissionWithOwner> {
        let owner = self.users.get(&mission.user_id)?;
        Some(MissionWithOwner {
            mission: mission.clone(),
            employee: owner.nom_et_prenom.clone(),
            department: owner.departement.clone(),
        })
    }

    fn validated_mission(&self, user_id: &str, date_mission: NaiveDate) -> Option<Mission> {
        self.missions
            .values()
            .find(|m| {
                m.user_id == user_id && m.date_mission == date_mission && m.statut == MissionStatus::Validee
            })
            .cloned()
    }
}

/// Orden de los listados: fecha de misión descendente, luego id
fn sort_by_date_desc(missions: &mut [Mission]) {
    missions.sort_by(|a, b| b.date_mission.cmp(&a.date_mission).then_with(|| a.id.cmp(&b.id)));
}

fn sort_owned_by_date_desc(missions: &mut [MissionWithOwner]) {
    missions.sort_by(|a, b| {
        b.mission
            .date_mission
            .cmp(&a.mission.date_mission)
            .then_with(|| a.mission.id.cmp(&b.mission.id))
    });
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<MemoryData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.data.lock().await.users.get(id).cloned())
    }

    async fn find_user_by_name(&self, nom_et_prenom: &str) -> AppResult<Option<User>> {
        let data = self.data.lock().await;
        Ok(data.users.values().find(|u| u.nom_et_prenom == nom_et_prenom).cloned())
    }

    async fn list_users(&self, role: Option<UserRole>) -> AppResult<Vec<User>> {
        let data = self.data.lock().await;
        let mut users: Vec<User> = data
            .users
            .values()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.nom_et_prenom.cmp(&b.nom_et_prenom));
        Ok(users)
    }

    async fn count_users(&self) -> AppResult<i64> {
        Ok(self.data.lock().await.users.len() as i64)
    }

    async fn insert_user(&self, user: &User) -> AppResult<()> {
        let mut data = self.data.lock().await;
        if data.users.contains_key(&user.id) {
            return Err(conflict_error("Employé", "id", &user.id));
        }
        data.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn update_user_profile(
        &self,
        id: &str,
        role: Option<UserRole>,
        credential: Option<String>,
    ) -> AppResult<u64> {
        let mut data = self.data.lock().await;
        let Some(user) = data.users.get_mut(id) else {
            return Ok(0);
        };
        if let Some(role) = role {
            user.role = role;
        }
        if credential.is_some() {
            user.mot_de_passe = credential;
        }
        Ok(1)
    }
}

#[async_trait]
impl VehicleStore for MemoryStore {
    async fn list_vehicles(&self, query: &VehicleQuery) -> AppResult<Vec<Vehicle>> {
        let data = self.data.lock().await;
        Ok(data.vehicles.values().filter(|v| query.matches(v)).cloned().collect())
    }

    async fn count_vehicles(&self) -> AppResult<i64> {
        Ok(self.data.lock().await.vehicles.len() as i64)
    }

    async fn insert_vehicle(&self, vehicle: &Vehicle) -> AppResult<()> {
        let mut data = self.data.lock().await;
        if data.vehicles.values().any(|v| v.immatriculation == vehicle.immatriculation) {
            return Err(conflict_error("Véhicule", "immatriculation", &vehicle.immatriculation));
        }
        if data.vehicles.contains_key(&vehicle.id) {
            return Err(conflict_error("Véhicule", "id", &vehicle.id));
        }
        data.vehicles.insert(vehicle.id.clone(), vehicle.clone());
        Ok(())
    }
}

#[async_trait]
impl MissionStore for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn MissionTx>> {
        let guard = self.data.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }

    async fn missions_for_user(&self, user_id: &str) -> AppResult<Vec<Mission>> {
        let data = self.data.lock().await;
        let mut missions: Vec<Mission> = data
            .missions
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        sort_by_date_desc(&mut missions);
        Ok(missions)
    }

    async fn pending_missions_for_manager(&self, manager_id: &str) -> AppResult<Vec<MissionWithOwner>> {
        let data = self.data.lock().await;
        let mut missions: Vec<MissionWithOwner> = data
            .missions
            .values()
            .filter(|m| m.statut == MissionStatus::EnAttente)
            .filter_map(|m| data.with_owner(m))
            .filter(|m| {
                data.users
                    .get(&m.mission.user_id)
                    .map_or(false, |owner| owner.reports_to(manager_id))
            })
            .collect();
        sort_owned_by_date_desc(&mut missions);
        Ok(missions)
    }

    async fn missions_by_reimbursement(
        &self,
        statuses: &[ReimbursementStatus],
        mission_status: Option<MissionStatus>,
    ) -> AppResult<Vec<MissionWithOwner>> {
        let data = self.data.lock().await;
        let mut missions: Vec<MissionWithOwner> = data
            .missions
            .values()
            .filter(|m| statuses.contains(&m.statut_remb))
            .filter(|m| mission_status.map_or(true, |s| m.statut == s))
            .filter_map(|m| data.with_owner(m))
            .collect();
        sort_owned_by_date_desc(&mut missions);
        Ok(missions)
    }

    async fn find_validated_mission(&self, user_id: &str, date_mission: NaiveDate) -> AppResult<Option<Mission>> {
        Ok(self.data.lock().await.validated_mission(user_id, date_mission))
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<MemoryData>,
    working: MemoryData,
}

#[async_trait]
impl MissionTx for MemoryTx {
    async fn find_user(&mut self, id: &str) -> AppResult<Option<User>> {
        Ok(self.working.users.get(id).cloned())
    }

    async fn find_mission(&mut self, id: &str) -> AppResult<Option<Mission>> {
        Ok(self.working.missions.get(id).cloned())
    }

    async fn find_validated_mission(&mut self, user_id: &str, date_mission: NaiveDate) -> AppResult<Option<Mission>> {
        Ok(self.working.validated_mission(user_id, date_mission))
    }

    async fn insert_mission(&mut self, mission: &Mission) -> AppResult<()> {
        if self.working.missions.contains_key(&mission.id) {
            return Err(conflict_error("Mission", "id", &mission.id));
        }
        self.working.missions.insert(mission.id.clone(), mission.clone());
        Ok(())
    }

    async fn update_mission_status(&mut self, id: &str, from: MissionStatus, to: MissionStatus) -> AppResult<u64> {
        match self.working.missions.get_mut(id) {
            Some(mission) if mission.statut == from => {
                mission.statut = to;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn record_return(
        &mut self,
        id: &str,
        compteur_depart: Option<i32>,
        compteur_arrivee: Option<i32>,
        detail_frais: &Value,
    ) -> AppResult<u64> {
        match self.working.missions.get_mut(id) {
            Some(mission) if mission.statut == MissionStatus::Validee => {
                mission.compteur_depart = compteur_depart;
                mission.compteur_arrivee = compteur_arrivee;
                mission.detail_frais = Some(detail_frais.clone());
                mission.statut_remb = ReimbursementStatus::EnAttente;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn update_reimbursement_status(
        &mut self,
        id: &str,
        from: ReimbursementStatus,
        to: ReimbursementStatus,
    ) -> AppResult<u64> {
        match self.working.missions.get_mut(id) {
            Some(mission) if mission.statut == MissionStatus::Validee && mission.statut_remb == from => {
                mission.statut_remb = to;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn vehicle_status(&mut self, id: &str) -> AppResult<Option<VehicleStatus>> {
        Ok(self.working.vehicles.get(id).map(|v| v.statut))
    }

    async fn transition_vehicle(&mut self, id: &str, from: VehicleStatus, to: VehicleStatus) -> AppResult<u64> {
        match self.working.vehicles.get_mut(id) {
            Some(vehicle) if vehicle.statut == from => {
                vehicle.statut = to;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
