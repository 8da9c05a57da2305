use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Error types for store configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The stored document fails invariant checks (negative fee, bad tier).
    /// Surfaced to the caller rather than silently defaulted.
    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),

    #[error("Store configuration not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Error types for delivery slot reservation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlotError {
    #[error("No slots available for this date")]
    DateNotFound,

    #[error("Time slot not found")]
    WindowNotFound,

    #[error("Slot not available or capacity exceeded")]
    CapacityExceeded,

    #[error("Store configuration not found")]
    ConfigNotFound,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for SlotError {
    fn from(err: sqlx::Error) -> Self {
        SlotError::Database(err.to_string())
    }
}

impl IntoResponse for ConfigError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ConfigError::InvalidConfig(msg) => (StatusCode::BAD_REQUEST, msg),
            ConfigError::NotFound => (
                StatusCode::NOT_FOUND,
                "Store configuration not found".to_string(),
            ),
            ConfigError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl IntoResponse for SlotError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            SlotError::DateNotFound => (
                StatusCode::BAD_REQUEST,
                "No slots available for this date".to_string(),
            ),
            SlotError::WindowNotFound => (StatusCode::BAD_REQUEST, "Time slot not found".to_string()),
            SlotError::CapacityExceeded => (
                StatusCode::BAD_REQUEST,
                "Slot not available or capacity exceeded".to_string(),
            ),
            SlotError::ConfigNotFound => (
                StatusCode::NOT_FOUND,
                "Store configuration not found".to_string(),
            ),
            SlotError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
