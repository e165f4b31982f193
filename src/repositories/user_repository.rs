use async_trait::async_trait;

use crate::models::user::{User, UserRole};
use crate::repositories::{PgStore, UserStore};
use crate::utils::errors::{map_db_error, AppError, AppResult};

#[async_trait]
impl UserStore for PgStore {
    async fn find_user(&self, id: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(user)
    }

    async fn find_user_by_name(&self, nom_et_prenom: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE nom_et_prenom = $1 ORDER BY id LIMIT 1",
        )
        .bind(nom_et_prenom)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(user)
    }

    async fn list_users(&self, role: Option<UserRole>) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE ($1::text IS NULL OR role = $1)
            ORDER BY nom_et_prenom ASC
            "#,
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(users)
    }

    async fn count_users(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(result.0)
    }

    async fn insert_user(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, nom_et_prenom, departement, email, num_tel, cin,
                role, manager_id, date_embauche, mot_de_passe
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&user.id)
        .bind(&user.nom_et_prenom)
        .bind(&user.departement)
        .bind(&user.email)
        .bind(&user.num_tel)
        .bind(&user.cin)
        .bind(user.role)
        .bind(&user.manager_id)
        .bind(user.date_embauche)
        .bind(&user.mot_de_passe)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Employé", "id", &user.id))?;

        Ok(())
    }

    async fn update_user_profile(
        &self,
        id: &str,
        role: Option<UserRole>,
        credential: Option<String>,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET role = COALESCE($2, role),
                mot_de_passe = COALESCE($3, mot_de_passe)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(role)
        .bind(credential)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(result.rows_affected())
    }
}
