use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::store_config::error::{ConfigError, SlotError};

/// Error types for order operations
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Order not found")]
    NotFound,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Some products in cart are no longer available")]
    InactiveProduct,

    #[error("Delivery slot unavailable: {0}")]
    SlotUnavailable(String),

    #[error("Order cannot be cancelled at this stage")]
    InvalidTransition(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Store configuration error: {0}")]
    ConfigurationError(String),
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        OrderError::DatabaseError(err.to_string())
    }
}

impl From<crate::error::ApiError> for OrderError {
    fn from(err: crate::error::ApiError) -> Self {
        match err {
            crate::error::ApiError::DatabaseError(e) => OrderError::DatabaseError(e.to_string()),
            other => OrderError::ValidationError(format!("{:?}", other)),
        }
    }
}

impl From<SlotError> for OrderError {
    fn from(err: SlotError) -> Self {
        match err {
            SlotError::Database(e) => OrderError::DatabaseError(e),
            other => OrderError::SlotUnavailable(other.to_string()),
        }
    }
}

impl From<ConfigError> for OrderError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Database(e) => OrderError::DatabaseError(e.to_string()),
            other => OrderError::ConfigurationError(other.to_string()),
        }
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            OrderError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            OrderError::NotFound => (StatusCode::NOT_FOUND, "Order not found".to_string()),
            OrderError::EmptyCart => (StatusCode::BAD_REQUEST, "Cart is empty".to_string()),
            OrderError::InactiveProduct => (
                StatusCode::BAD_REQUEST,
                "Some products in cart are no longer available".to_string(),
            ),
            OrderError::SlotUnavailable(msg) => (StatusCode::BAD_REQUEST, msg),
            OrderError::InvalidTransition(msg) => (StatusCode::BAD_REQUEST, msg),
            OrderError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            OrderError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            OrderError::ConfigurationError(msg) => {
                tracing::error!("Store configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Store configuration error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
