use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

// Request para crear un vehículo (back-office)
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, max = 50))]
    pub marque: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub modele: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub matricule: Option<String>,
    /// Número o cadena numérica
    pub puissance: Option<Value>,
}

// Filtros del parque automóvil
#[derive(Debug, Default, Deserialize)]
pub struct VehicleFilters {
    pub statut: Option<String>,
    pub marque: Option<String>,
    pub min_puissance: Option<i32>,
    pub max_puissance: Option<i32>,
}
