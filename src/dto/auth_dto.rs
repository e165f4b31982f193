use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::user::UserRole;

// Login request (formularios de acceso de cada panel)
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub nom_et_prenom: Option<String>,
    #[serde(rename = "motDePasse")]
    pub mot_de_passe: Option<String>,
}

// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: UserRole,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}
