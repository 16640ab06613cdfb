use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::models::InvalidStudent;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found")]
    NotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<InvalidStudent> for AppError {
    fn from(e: InvalidStudent) -> Self {
        AppError::Validation(e.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Database(e) => {
                let unique = e
                    .as_database_error()
                    .map(|db| db.is_unique_violation())
                    .unwrap_or(false);
                if unique {
                    (
                        StatusCode::CONFLICT,
                        "Record already exists".to_string(),
                    )
                } else {
                    error!("database error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Database error occurred".to_string(),
                    )
                }
            }
            AppError::Storage(e) => {
                let status = match &e {
                    StorageError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                    StorageError::NotAnImage(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    StorageError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
                    StorageError::Transport(_) | StorageError::Rejected { .. } => {
                        error!("storage error: {}", e);
                        StatusCode::BAD_GATEWAY
                    }
                };
                (status, e.to_string())
            }
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}
