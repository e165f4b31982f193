//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("Hash error: {0}")]
    Hash(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

/// Mensaje genérico para fallos del almacén: se asumen transitorios
const RETRY_MESSAGE: &str = "Erreur interne du serveur, veuillez réessayer.";

impl AppError {
    /// Código estable que acompaña a cada tipo de error en la respuesta
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DB_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Internal(_) => "INTERNAL_ERROR",
            AppError::Jwt(_) => "JWT_ERROR",
            AppError::Hash(_) => "HASH_ERROR",
        }
    }
}

impl AppError {
    /// Estado HTTP y título de cada código de error
    fn status_and_title(&self) -> (StatusCode, &'static str) {
        match self.code() {
            "VALIDATION_ERROR" => (StatusCode::BAD_REQUEST, "Validation Error"),
            "BAD_REQUEST" => (StatusCode::BAD_REQUEST, "Bad Request"),
            "UNAUTHORIZED" => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            "JWT_ERROR" => (StatusCode::UNAUTHORIZED, "JWT Error"),
            "FORBIDDEN" => (StatusCode::FORBIDDEN, "Forbidden"),
            "NOT_FOUND" => (StatusCode::NOT_FOUND, "Not Found"),
            "CONFLICT" => (StatusCode::CONFLICT, "Conflict"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, title) = self.status_and_title();
        let code = self.code();

        if status.is_server_error() {
            log::error!("❌ {} [{}]: {}", title, code, self);
        } else if status == StatusCode::NOT_FOUND {
            log::info!("{}: {}", title, self);
        } else {
            log::warn!("{}: {}", title, self);
        }

        // Los fallos del almacén no exponen detalles al cliente
        let (message, details) = match self {
            AppError::Validation(e) => ("Les données fournies sont invalides.".to_string(), Some(json!(e))),
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::BadRequest(msg)
            | AppError::Jwt(msg) => (msg, None),
            AppError::Database(_) | AppError::Internal(_) | AppError::Hash(_) => (RETRY_MESSAGE.to_string(), None),
        };

        let body = ErrorResponse {
            error: title.to_string(),
            message,
            details,
            code: Some(code.to_string()),
        };

        (status, Json(body)).into_response()
    }
}

/// Cuerpo JSON ilegible o con tipos incorrectos: error de validación
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let mut error = validator::ValidationError::new("json");
        error.message = Some(rejection.body_text().into());

        let mut errors = validator::ValidationErrors::new();
        errors.add("body", error);

        AppError::Validation(errors)
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de validación
pub fn validation_error(field: &'static str, message: &'static str) -> AppError {
    use validator::ValidationError;

    let mut error = ValidationError::new("custom");
    error.add_param("field".into(), &field);
    error.add_param("message".into(), &message);

    let mut errors = validator::ValidationErrors::new();
    errors.add(field, error);

    AppError::Validation(errors)
}

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} '{}' introuvable", resource, id))
}

/// Función helper para crear errores de conflicto
pub fn conflict_error(resource: &str, field: &str, value: &str) -> AppError {
    AppError::Conflict(format!("{} avec {} '{}' existe déjà", resource, field, value))
}

/// Función helper para crear errores de acceso prohibido
pub fn forbidden_error(operation: &str, reason: &str) -> AppError {
    AppError::Forbidden(format!("Impossible de {} : {}", operation, reason))
}

/// Función helper para crear errores de solicitud incorrecta
pub fn bad_request_error(message: &str) -> AppError {
    AppError::BadRequest(message.to_string())
}

/// Traducir errores de sqlx: las violaciones de unicidad (23505) son conflictos
pub fn map_db_error(e: sqlx::Error, resource: &str, field: &str, value: &str) -> AppError {
    if let sqlx::Error::Database(db_error) = &e {
        if db_error.code().as_deref() == Some("23505") {
            return conflict_error(resource, field, value);
        }
    }
    AppError::Database(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_status_codes_per_error_kind() {
        let (status, body) = body_json(validation_error("objet", "required")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, _) = body_json(not_found_error("Mission", "ms-1")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = body_json(AppError::Unauthorized("no token".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = body_json(AppError::Conflict("busy".into())).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = body_json(forbidden_error("décider", "autre équipe")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Forbidden");

        let (status, body) = body_json(AppError::Jwt("expired".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "JWT_ERROR");
    }

    #[tokio::test]
    async fn test_persistence_errors_hide_details() {
        let (status, body) = body_json(AppError::Database(sqlx::Error::PoolTimedOut)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], RETRY_MESSAGE);
        assert!(body.get("details").is_none());
    }
}
