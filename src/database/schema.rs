//! Schema de la base de datos
//!
//! Sentencias idempotentes ejecutadas al arrancar.

use sqlx::PgPool;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id              TEXT PRIMARY KEY,
        nom_et_prenom   TEXT NOT NULL,
        departement     TEXT NOT NULL,
        email           TEXT NOT NULL,
        num_tel         TEXT NOT NULL,
        cin             TEXT NOT NULL,
        role            TEXT NOT NULL CHECK (role IN ('admin', 'manager', 'employe', 'financier')),
        manager_id      TEXT REFERENCES users (id),
        date_embauche   DATE NOT NULL,
        mot_de_passe    TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS vehicule (
        id              TEXT PRIMARY KEY,
        immatriculation TEXT NOT NULL UNIQUE,
        marque          TEXT NOT NULL,
        modele          TEXT NOT NULL,
        puissance       INTEGER NOT NULL CHECK (puissance > 0),
        statut          TEXT NOT NULL DEFAULT 'Disponible'
                        CHECK (statut IN ('Disponible', 'En attente', 'En mission', 'Maintenance'))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS mission (
        id                TEXT PRIMARY KEY,
        user_id           TEXT NOT NULL REFERENCES users (id),
        vehicule_id       TEXT REFERENCES vehicule (id),
        date_mission      DATE NOT NULL,
        date_sortie       DATE NOT NULL,
        heure_sortie      TIME NOT NULL,
        date_retour       DATE NOT NULL,
        heure_retour      TIME NOT NULL,
        depart            TEXT NOT NULL,
        destination       TEXT NOT NULL,
        objet             TEXT NOT NULL,
        frais_de_mission  NUMERIC(12, 2) NOT NULL DEFAULT 0,
        statut            TEXT NOT NULL DEFAULT 'En attente'
                          CHECK (statut IN ('En attente', 'Validée', 'Refusée')),
        statut_remb       TEXT NOT NULL DEFAULT 'En attente'
                          CHECK (statut_remb IN ('En attente', 'Validée', 'Refusée', 'Payé')),
        compteur_depart   INTEGER,
        compteur_arrivee  INTEGER,
        detail_frais      JSONB,
        vehicule          TEXT NOT NULL
                          CHECK (vehicule IN ('moyen publique', 'voiture de service', 'voiture personnelle')),
        immatriculation   TEXT,
        departement       TEXT NOT NULL,
        CHECK (vehicule <> 'voiture de service' OR vehicule_id IS NOT NULL)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS mission_user_date_idx ON mission (user_id, date_mission)",
    "CREATE INDEX IF NOT EXISTS users_manager_idx ON users (manager_id)",
];

/// Crear las tablas que falten
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    log::info!("📋 Schema vérifié ({} instructions)", SCHEMA.len());
    Ok(())
}
