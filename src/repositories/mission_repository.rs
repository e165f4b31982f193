use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use sqlx::{Postgres, Transaction};

use crate::models::{
    mission::{Mission, MissionStatus, MissionWithOwner, ReimbursementStatus},
    user::User,
    vehicle::VehicleStatus,
};
use crate::repositories::{MissionStore, MissionTx, PgStore};
use crate::utils::errors::{AppError, AppResult};

const MISSION_WITH_OWNER: &str = r#"
    SELECT mission.*, users.nom_et_prenom AS employee, users.departement AS department
    FROM mission
    JOIN users ON mission.user_id = users.id
"#;

#[async_trait]
impl MissionStore for PgStore {
    async fn begin(&self) -> AppResult<Box<dyn MissionTx>> {
        let tx = self.pool.begin().await.map_err(AppError::Database)?;
        Ok(Box::new(PgMissionTx { tx }))
    }

    async fn missions_for_user(&self, user_id: &str) -> AppResult<Vec<Mission>> {
        let missions = sqlx::query_as::<_, Mission>(
            "SELECT * FROM mission WHERE user_id = $1 ORDER BY date_mission DESC, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(missions)
    }

    async fn pending_missions_for_manager(&self, manager_id: &str) -> AppResult<Vec<MissionWithOwner>> {
        let sql = format!(
            "{} WHERE mission.statut = $1 AND users.manager_id = $2 ORDER BY mission.date_mission DESC, mission.id ASC",
            MISSION_WITH_OWNER
        );
        let missions = sqlx::query_as::<_, MissionWithOwner>(&sql)
            .bind(MissionStatus::EnAttente)
            .bind(manager_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(missions)
    }

    async fn missions_by_reimbursement(
        &self,
        statuses: &[ReimbursementStatus],
        mission_status: Option<MissionStatus>,
    ) -> AppResult<Vec<MissionWithOwner>> {
        let sql = format!(
            "{} WHERE mission.statut_remb = ANY($1) AND ($2::text IS NULL OR mission.statut = $2) \
             ORDER BY mission.date_mission DESC, mission.id ASC",
            MISSION_WITH_OWNER
        );
        let statuses: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();
        let missions = sqlx::query_as::<_, MissionWithOwner>(&sql)
            .bind(statuses)
            .bind(mission_status)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(missions)
    }

    async fn find_validated_mission(&self, user_id: &str, date_mission: NaiveDate) -> AppResult<Option<Mission>> {
        let mission = sqlx::query_as::<_, Mission>(
            "SELECT * FROM mission WHERE user_id = $1 AND date_mission = $2 AND statut = $3 ORDER BY id LIMIT 1",
        )
        .bind(user_id)
        .bind(date_mission)
        .bind(MissionStatus::Validee)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(mission)
    }
}

/// Transacción PostgreSQL. Si se descarta sin `commit()`, sqlx hace rollback.
pub struct PgMissionTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl MissionTx for PgMissionTx {
    async fn find_user(&mut self, id: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(AppError::Database)?;

        Ok(user)
    }

    async fn find_mission(&mut self, id: &str) -> AppResult<Option<Mission>> {
        let mission = sqlx::query_as::<_, Mission>("SELECT * FROM mission WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(AppError::Database)?;

        Ok(mission)
    }

    async fn find_validated_mission(&mut self, user_id: &str, date_mission: NaiveDate) -> AppResult<Option<Mission>> {
        let mission = sqlx::query_as::<_, Mission>(
            "SELECT * FROM mission WHERE user_id = $1 AND date_mission = $2 AND statut = $3 ORDER BY id LIMIT 1",
        )
        .bind(user_id)
        .bind(date_mission)
        .bind(MissionStatus::Validee)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(AppError::Database)?;

        Ok(mission)
    }

    async fn insert_mission(&mut self, mission: &Mission) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO mission (
                id, user_id, vehicule_id, date_mission, date_sortie, heure_sortie,
                date_retour, heure_retour, depart, destination, objet, frais_de_mission,
                statut, statut_remb, compteur_depart, compteur_arrivee, detail_frais,
                vehicule, immatriculation, departement
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            "#,
        )
        .bind(&mission.id)
        .bind(&mission.user_id)
        .bind(&mission.vehicule_id)
        .bind(mission.date_mission)
        .bind(mission.date_sortie)
        .bind(mission.heure_sortie)
        .bind(mission.date_retour)
        .bind(mission.heure_retour)
        .bind(&mission.depart)
        .bind(&mission.destination)
        .bind(&mission.objet)
        .bind(mission.frais_de_mission)
        .bind(mission.statut)
        .bind(mission.statut_remb)
        .bind(mission.compteur_depart)
        .bind(mission.compteur_arrivee)
        .bind(&mission.detail_frais)
        .bind(mission.vehicule)
        .bind(&mission.immatriculation)
        .bind(&mission.departement)
        .execute(&mut *self.tx)
        .await
        .map_err(AppError::Database)?;

        Ok(())
    }

    async fn update_mission_status(&mut self, id: &str, from: MissionStatus, to: MissionStatus) -> AppResult<u64> {
        let result = sqlx::query("UPDATE mission SET statut = $3 WHERE id = $1 AND statut = $2")
            .bind(id)
            .bind(from)
            .bind(to)
            .execute(&mut *self.tx)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected())
    }

    async fn record_return(
        &mut self,
        id: &str,
        compteur_depart: Option<i32>,
        compteur_arrivee: Option<i32>,
        detail_frais: &Value,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE mission
            SET compteur_depart = $2, compteur_arrivee = $3, detail_frais = $4, statut_remb = $5
            WHERE id = $1 AND statut = $6
            "#,
        )
        .bind(id)
        .bind(compteur_depart)
        .bind(compteur_arrivee)
        .bind(detail_frais)
        .bind(ReimbursementStatus::EnAttente)
        .bind(MissionStatus::Validee)
        .execute(&mut *self.tx)
        .await
        .map_err(AppError::Database)?;

        Ok(result.rows_affected())
    }

    async fn update_reimbursement_status(
        &mut self,
        id: &str,
        from: ReimbursementStatus,
        to: ReimbursementStatus,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE mission SET statut_remb = $3 WHERE id = $1 AND statut_remb = $2 AND statut = $4",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(MissionStatus::Validee)
        .execute(&mut *self.tx)
        .await
        .map_err(AppError::Database)?;

        Ok(result.rows_affected())
    }

    async fn vehicle_status(&mut self, id: &str) -> AppResult<Option<VehicleStatus>> {
        let row: Option<(VehicleStatus,)> = sqlx::query_as("SELECT statut FROM vehicule WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(AppError::Database)?;

        Ok(row.map(|(statut,)| statut))
    }

    async fn transition_vehicle(&mut self, id: &str, from: VehicleStatus, to: VehicleStatus) -> AppResult<u64> {
        let result = sqlx::query("UPDATE vehicule SET statut = $3 WHERE id = $1 AND statut = $2")
            .bind(id)
            .bind(from)
            .bind(to)
            .execute(&mut *self.tx)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await.map_err(AppError::Database)
    }
}
