//! Back-office: personal y parque automóvil. Sólo administradores.

use std::sync::Arc;

use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::dto::personnel_dto::{CreateEmployeeRequest, PersonnelFilters, UpdateProfileRequest};
use crate::dto::vehicle_dto::CreateVehicleRequest;
use crate::middleware::auth::{require_role, AuthenticatedUser};
use crate::models::{
    user::{User, UserRole},
    vehicle::{Vehicle, VehicleStatus},
};
use crate::repositories::{Store, UserStore, VehicleStore};
use crate::services::auth_service::hash_password;
use crate::utils::errors::{not_found_error, validation_error, AppResult};
use crate::utils::validation::{field_error, optional_count, required, required_date};

fn parse_role(field: &'static str, raw: &str) -> AppResult<UserRole> {
    UserRole::from_str(raw).ok_or_else(|| field_error(field, ValidationError::new("role")))
}

pub struct BackofficeService {
    store: Arc<dyn Store>,
}

impl BackofficeService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list_personnel(&self, caller: &AuthenticatedUser, filters: PersonnelFilters) -> AppResult<Vec<User>> {
        require_role(caller, &[UserRole::Admin])?;

        let role = match filters.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            Some(raw) => Some(parse_role("role", raw)?),
            None => None,
        };

        self.store.list_users(role).await
    }

    pub async fn count_personnel(&self, caller: &AuthenticatedUser) -> AppResult<i64> {
        require_role(caller, &[UserRole::Admin])?;
        self.store.count_users().await
    }

    pub async fn count_vehicles(&self, caller: &AuthenticatedUser) -> AppResult<i64> {
        require_role(caller, &[UserRole::Admin])?;
        self.store.count_vehicles().await
    }

    /// Alta de empleado, sin credencial hasta la primera modificación de perfil
    pub async fn add_employee(&self, caller: &AuthenticatedUser, request: CreateEmployeeRequest) -> AppResult<String> {
        require_role(caller, &[UserRole::Admin])?;
        request.validate()?;

        let role = parse_role("role", required("role", &request.role)?)?;

        let manager_id = request
            .manager_id
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string);
        if let Some(manager_id) = &manager_id {
            if self.store.find_user(manager_id).await?.is_none() {
                return Err(not_found_error("Manager", manager_id));
            }
        }

        let user = User {
            id: required("employeeId", &request.employee_id)?.to_string(),
            nom_et_prenom: required("nom_et_prenom", &request.nom_et_prenom)?.to_string(),
            departement: required("département", &request.departement)?.to_string(),
            email: required("email", &request.email)?.to_string(),
            num_tel: required("telephone", &request.telephone)?.to_string(),
            cin: required("cin", &request.cin)?.to_string(),
            role,
            manager_id,
            date_embauche: required_date("date_dembauche", &request.date_dembauche)?,
            mot_de_passe: None,
        };

        self.store.insert_user(&user).await?;
        log::info!("👤 Empleado {} añadido ({})", user.id, user.role);

        Ok(user.id)
    }

    /// Alta de vehículo `Disponible`
    pub async fn add_vehicle(&self, caller: &AuthenticatedUser, request: CreateVehicleRequest) -> AppResult<String> {
        require_role(caller, &[UserRole::Admin])?;
        request.validate()?;

        let puissance = optional_count("puissance", &request.puissance)?
            .ok_or_else(|| field_error("puissance", ValidationError::new("required")))?;
        if puissance <= 0 {
            return Err(validation_error("puissance", "La puissance doit être strictement positive"));
        }

        let vehicle = Vehicle {
            id: format!("vt-{}", Uuid::new_v4().simple()),
            immatriculation: required("matricule", &request.matricule)?.to_string(),
            marque: required("marque", &request.marque)?.to_string(),
            modele: required("modele", &request.modele)?.to_string(),
            puissance,
            statut: VehicleStatus::Disponible,
        };

        self.store.insert_vehicle(&vehicle).await?;
        log::info!("🚗 Vehículo {} añadido ({})", vehicle.id, vehicle.immatriculation);

        Ok(vehicle.id)
    }

    /// Cambio de rol y/o contraseña; la contraseña se guarda como hash bcrypt
    pub async fn update_profile(
        &self,
        caller: &AuthenticatedUser,
        user_id: &str,
        request: UpdateProfileRequest,
    ) -> AppResult<()> {
        require_role(caller, &[UserRole::Admin])?;
        request.validate()?;

        let role = match request.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            Some(raw) => Some(parse_role("role", raw)?),
            None => None,
        };
        let credential = match request.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        if role.is_none() && credential.is_none() {
            return Err(validation_error("profile", "Indiquez un nouveau rôle ou un nouveau mot de passe"));
        }

        let updated = self.store.update_user_profile(user_id, role, credential).await?;
        if updated == 0 {
            return Err(not_found_error("Employé", user_id));
        }

        log::info!("👤 Perfil de {} actualizado", user_id);
        Ok(())
    }
}
