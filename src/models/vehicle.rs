//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle del parque automóvil.
//! Mapea exactamente a la tabla `vehicule`.

use serde::Serialize;
use sqlx::FromRow;

text_enum! {
    /// Estado del vehículo. Sólo el ciclo de vida de misiones lo modifica
    /// después de la creación.
    VehicleStatus {
        Disponible => "Disponible",
        EnAttente => "En attente",
        EnMission => "En mission",
        Maintenance => "Maintenance",
    }
}

impl VehicleStatus {
    /// Un vehículo reservado o en ruta no puede asignarse a otra misión
    pub fn is_engaged(&self) -> bool {
        matches!(self, VehicleStatus::EnAttente | VehicleStatus::EnMission)
    }
}

/// Vehicle principal
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Vehicle {
    pub id: String,
    pub immatriculation: String,
    pub marque: String,
    pub modele: String,
    pub puissance: i32,
    pub statut: VehicleStatus,
}

/// Filtros para búsqueda de vehículos (ya validados)
#[derive(Debug, Clone, Default)]
pub struct VehicleQuery {
    pub statut: Option<VehicleStatus>,
    pub marque: Option<String>,
    pub min_puissance: Option<i32>,
    pub max_puissance: Option<i32>,
}

impl VehicleQuery {
    pub fn available() -> Self {
        Self {
            statut: Some(VehicleStatus::Disponible),
            ..Self::default()
        }
    }

    /// Misma semántica que el WHERE del repositorio PostgreSQL
    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        self.statut.map_or(true, |s| vehicle.statut == s)
            && self
                .marque
                .as_deref()
                .map_or(true, |m| vehicle.marque.to_lowercase() == m.to_lowercase())
            && self.min_puissance.map_or(true, |min| vehicle.puissance >= min)
            && self.max_puissance.map_or(true, |max| vehicle.puissance <= max)
    }
}
