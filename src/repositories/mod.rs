//! Repositorios
//!
//! Acceso al almacén a través de traits para poder inyectar PostgreSQL en
//! producción y el almacén en memoria en desarrollo y tests. Las operaciones
//! del ciclo de vida pasan por [`MissionTx`]: una transacción con alcance
//! que se confirma con `commit()` y se revierte si se descarta.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use sqlx::PgPool;

use crate::models::{
    mission::{Mission, MissionStatus, MissionWithOwner, ReimbursementStatus},
    user::{User, UserRole},
    vehicle::{Vehicle, VehicleQuery, VehicleStatus},
};
use crate::utils::errors::AppResult;

pub mod memory;
pub mod mission_repository;
pub mod user_repository;
pub mod vehicle_repository;

pub use memory::MemoryStore;
pub use mission_repository::PgMissionTx;

/// Almacén PostgreSQL; cada trait se implementa en su repositorio
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: &str) -> AppResult<Option<User>>;

    async fn find_user_by_name(&self, nom_et_prenom: &str) -> AppResult<Option<User>>;

    async fn list_users(&self, role: Option<UserRole>) -> AppResult<Vec<User>>;

    async fn count_users(&self) -> AppResult<i64>;

    /// `Conflict` si el identificador ya existe
    async fn insert_user(&self, user: &User) -> AppResult<()>;

    /// Devuelve el número de filas afectadas
    async fn update_user_profile(
        &self,
        id: &str,
        role: Option<UserRole>,
        credential: Option<String>,
    ) -> AppResult<u64>;
}

#[async_trait]
pub trait VehicleStore: Send + Sync {
    async fn list_vehicles(&self, query: &VehicleQuery) -> AppResult<Vec<Vehicle>>;

    async fn count_vehicles(&self) -> AppResult<i64>;

    /// `Conflict` si la matrícula ya existe
    async fn insert_vehicle(&self, vehicle: &Vehicle) -> AppResult<()>;
}

#[async_trait]
pub trait MissionStore: Send + Sync {
    /// Abrir una transacción
    async fn begin(&self) -> AppResult<Box<dyn MissionTx>>;

    /// Misiones de un usuario, la más reciente primero
    async fn missions_for_user(&self, user_id: &str) -> AppResult<Vec<Mission>>;

    /// Misiones `En attente` de los subordinados de un manager
    async fn pending_missions_for_manager(&self, manager_id: &str) -> AppResult<Vec<MissionWithOwner>>;

    /// Misiones por estado de reembolso, opcionalmente restringidas a un
    /// estado de misión
    async fn missions_by_reimbursement(
        &self,
        statuses: &[ReimbursementStatus],
        mission_status: Option<MissionStatus>,
    ) -> AppResult<Vec<MissionWithOwner>>;

    /// Misión validada de un usuario para una fecha
    async fn find_validated_mission(&self, user_id: &str, date_mission: NaiveDate) -> AppResult<Option<Mission>>;
}

/// Transacción del ciclo de vida. Las escrituras de estado son
/// condicionales (`WHERE statut = esperado`) y devuelven las filas
/// afectadas; 0 significa que otro request cambió la fila antes.
#[async_trait]
pub trait MissionTx: Send {
    async fn find_user(&mut self, id: &str) -> AppResult<Option<User>>;

    async fn find_mission(&mut self, id: &str) -> AppResult<Option<Mission>>;

    async fn find_validated_mission(&mut self, user_id: &str, date_mission: NaiveDate) -> AppResult<Option<Mission>>;

    async fn insert_mission(&mut self, mission: &Mission) -> AppResult<()>;

    async fn update_mission_status(&mut self, id: &str, from: MissionStatus, to: MissionStatus) -> AppResult<u64>;

    /// Guardar contadores y detalle de gastos; `statut_remb` vuelve a `En attente`
    async fn record_return(
        &mut self,
        id: &str,
        compteur_depart: Option<i32>,
        compteur_arrivee: Option<i32>,
        detail_frais: &Value,
    ) -> AppResult<u64>;

    /// Sólo afecta misiones `Validée` cuyo reembolso está en `from`
    async fn update_reimbursement_status(
        &mut self,
        id: &str,
        from: ReimbursementStatus,
        to: ReimbursementStatus,
    ) -> AppResult<u64>;

    async fn vehicle_status(&mut self, id: &str) -> AppResult<Option<VehicleStatus>>;

    async fn transition_vehicle(&mut self, id: &str, from: VehicleStatus, to: VehicleStatus) -> AppResult<u64>;

    async fn commit(self: Box<Self>) -> AppResult<()>;
}

/// Almacén completo que reciben los servicios
pub trait Store: UserStore + VehicleStore + MissionStore {}

impl<T: UserStore + VehicleStore + MissionStore> Store for T {}
