//! Modelo de User
//!
//! Mapea la tabla `users`. La credencial nunca se serializa hacia el cliente.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

text_enum! {
    /// Roles del sistema
    UserRole {
        Admin => "admin",
        Manager => "manager",
        Employe => "employe",
        Financier => "financier",
    }
}

/// User principal - mapea exactamente a la tabla users
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: String,
    pub nom_et_prenom: String,
    #[serde(rename = "département")]
    pub departement: String,
    pub email: String,
    pub num_tel: String,
    pub cin: String,
    pub role: UserRole,
    pub manager_id: Option<String>,
    pub date_embauche: NaiveDate,
    #[serde(skip_serializing)]
    pub mot_de_passe: Option<String>,
}

impl User {
    /// ¿Es `manager_id` el responsable directo de este usuario?
    pub fn reports_to(&self, manager_id: &str) -> bool {
        self.manager_id.as_deref() == Some(manager_id)
    }
}
