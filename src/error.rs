//! Domain error types for the log vault server.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Resource not found (record unknown, soft-deleted, or blob missing)
    #[error("{0}")]
    NotFound(String),

    /// Invalid input data
    #[error("{0}")]
    InvalidInput(String),

    /// Request body exceeds the configured upload limit
    #[error("File too large")]
    PayloadTooLarge,

    /// Filesystem operation on the blob store failed
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Database(err_str) => {
                tracing::error!("Database error: {}", err_str);
                "Internal server error".to_string()
            }
            AppError::Storage(err_str) => {
                tracing::error!("Storage error: {}", err_str);
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse { error: message })
    }
}

/// Error response body matching OpenAPI schema.
#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

// Conversion implementations for common error types

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Storage(format!("Blocking task failed: {}", err))
    }
}
