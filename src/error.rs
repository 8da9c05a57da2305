// Error handling module for the Market API
// Provides centralized error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, warn};

/// Main error type for the API
/// All catalog and cart handlers return Result<T, ApiError>
///
/// Each variant maps to a specific HTTP status code and error response format.
#[derive(Debug)]
pub enum ApiError {
    /// Validation errors from request validation
    /// Maps to HTTP 400 Bad Request
    ValidationError(validator::ValidationErrors),

    /// Malformed request input that the validator derive cannot express
    /// Maps to HTTP 400 Bad Request
    BadRequest(String),

    /// Resource not found by ID
    /// Maps to HTTP 404 Not Found
    NotFound { resource: String, id: String },

    /// Database operation errors
    /// Maps to HTTP 500 Internal Server Error
    /// Sensitive details are filtered from client responses
    DatabaseError(sqlx::Error),

    /// Internal server errors
    /// Maps to HTTP 500 Internal Server Error
    InternalError(String),

    /// Authentication failures
    /// Maps to HTTP 401 Unauthorized
    Unauthorized(String),
}

/// Consistent error response structure
///
/// Defines the JSON format for all error responses: a machine-readable
/// error_code, a human-readable message, and optional field-level details.
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "VALIDATION_ERROR", "NOT_FOUND")
    pub error_code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (e.g., field-level validation errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// ISO 8601 timestamp of when the error occurred
    pub timestamp: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = self.to_error_response();
        (status, Json(error_response)).into_response()
    }
}

impl ApiError {
    /// Convert ApiError to HTTP status code and ErrorResponse
    ///
    /// Logs at a level matching severity: error! for 500s, warn! for security
    /// concerns, debug! for expected client errors. Database details are never
    /// exposed to clients.
    fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);

                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error_code: "VALIDATION_ERROR".to_string(),
                        message: "Request validation failed".to_string(),
                        details: Some(
                            serde_json::to_value(errors).unwrap_or(serde_json::json!({})),
                        ),
                        timestamp: Utc::now().to_rfc3339(),
                    },
                )
            }
            ApiError::BadRequest(message) => {
                debug!("Bad request: {}", message);

                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error_code: "BAD_REQUEST".to_string(),
                        message: message.clone(),
                        details: None,
                        timestamp: Utc::now().to_rfc3339(),
                    },
                )
            }
            ApiError::NotFound { resource, id } => {
                debug!("Resource not found: {} with id {}", resource, id);

                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse {
                        error_code: "NOT_FOUND".to_string(),
                        message: format!("{} with id {} not found", resource, id),
                        details: None,
                        timestamp: Utc::now().to_rfc3339(),
                    },
                )
            }
            ApiError::DatabaseError(db_error) => {
                // Full error is logged internally; clients get a generic message
                error!("Database error: {:?}", db_error);

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error_code: "DATABASE_ERROR".to_string(),
                        message: "A database error occurred".to_string(),
                        details: None,
                        timestamp: Utc::now().to_rfc3339(),
                    },
                )
            }
            ApiError::InternalError(internal_msg) => {
                error!("Internal error: {}", internal_msg);

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error_code: "INTERNAL_ERROR".to_string(),
                        message: "An internal server error occurred".to_string(),
                        details: None,
                        timestamp: Utc::now().to_rfc3339(),
                    },
                )
            }
            ApiError::Unauthorized(message) => {
                warn!("Unauthorized access attempt: {}", message);

                (
                    StatusCode::UNAUTHORIZED,
                    ErrorResponse {
                        error_code: "UNAUTHORIZED".to_string(),
                        message: message.clone(),
                        details: None,
                        timestamp: Utc::now().to_rfc3339(),
                    },
                )
            }
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

/// Convert sqlx errors to ApiError
impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        ApiError::DatabaseError(error)
    }
}

/// Convert validator errors to ApiError
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::BadRequest("bad".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound {
                resource: "Product".to_string(),
                id: "x".to_string()
            }
            .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Unauthorized("no header".to_string()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::InternalError("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_database_error_is_filtered() {
        let err = ApiError::DatabaseError(sqlx::Error::RowNotFound);
        let (status, response) = err.to_error_response();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.error_code, "DATABASE_ERROR");
        // The client-facing message must not contain driver internals
        assert_eq!(response.message, "A database error occurred");
    }
}
