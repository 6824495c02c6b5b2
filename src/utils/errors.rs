//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
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

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Respuesta uniforme de error para la API: `{success: false, message}`
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
}

impl ErrorResponse {
    fn new(message: String) -> Self {
        Self {
            success: false,
            message,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Database(e) => {
                eprintln!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred while accessing the database".to_string(),
                )
            }

            AppError::Validation(e) => {
                eprintln!("Validation error: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    format!("Invalid request data: {}", e),
                )
            }

            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),

            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),

            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),

            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),

            AppError::InvalidTransition(msg) => (StatusCode::CONFLICT, msg),

            AppError::ResourceUnavailable(msg) => (StatusCode::CONFLICT, msg),

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),

            AppError::Internal(msg) => {
                eprintln!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;
