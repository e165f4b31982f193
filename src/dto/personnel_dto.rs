use serde::Deserialize;
use validator::Validate;

// Request para añadir un empleado (formulario "Ajouter employé")
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateEmployeeRequest {
    #[serde(rename = "employeeId")]
    #[validate(required, length(min = 1, max = 50))]
    pub employee_id: Option<String>,
    #[validate(required, length(min = 1, max = 100))]
    pub nom_et_prenom: Option<String>,
    #[serde(rename = "département", alias = "departement")]
    #[validate(required, length(min = 1, max = 100))]
    pub departement: Option<String>,
    #[validate(required)]
    pub date_dembauche: Option<String>,
    #[validate(required, email)]
    pub email: Option<String>,
    #[validate(required, length(min = 1, max = 20))]
    pub telephone: Option<String>,
    #[validate(required, length(min = 1, max = 20))]
    pub cin: Option<String>,
    #[validate(required)]
    pub role: Option<String>,
    pub manager_id: Option<String>,
}

// Request de modificación de perfil: nuevo rol y/o nueva contraseña
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    pub role: Option<String>,
    #[serde(alias = "motDePasse")]
    #[validate(length(min = 4, max = 128))]
    pub password: Option<String>,
}

// Filtro de la lista del personal
#[derive(Debug, Default, Deserialize)]
pub struct PersonnelFilters {
    pub role: Option<String>,
}
