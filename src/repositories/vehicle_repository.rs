use async_trait::async_trait;

use crate::models::vehicle::{Vehicle, VehicleQuery};
use crate::repositories::{PgStore, VehicleStore};
use crate::utils::errors::{map_db_error, AppError, AppResult};

#[async_trait]
impl VehicleStore for PgStore {
    async fn list_vehicles(&self, query: &VehicleQuery) -> AppResult<Vec<Vehicle>> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT * FROM vehicule
            WHERE ($1::text IS NULL OR statut = $1)
            AND ($2::text IS NULL OR LOWER(marque) = LOWER($2))
            AND ($3::int IS NULL OR puissance >= $3)
            AND ($4::int IS NULL OR puissance <= $4)
            ORDER BY id ASC
            "#,
        )
        .bind(query.statut)
        .bind(query.marque.as_deref())
        .bind(query.min_puissance)
        .bind(query.max_puissance)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(vehicles)
    }

    async fn count_vehicles(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM vehicule")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(result.0)
    }

    async fn insert_vehicle(&self, vehicle: &Vehicle) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO vehicule (id, immatriculation, marque, modele, puissance, statut)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&vehicle.id)
        .bind(&vehicle.immatriculation)
        .bind(&vehicle.marque)
        .bind(&vehicle.modele)
        .bind(vehicle.puissance)
        .bind(vehicle.statut)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Véhicule", "immatriculation", &vehicle.immatriculation))?;

        Ok(())
    }
}
