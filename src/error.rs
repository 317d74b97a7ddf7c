use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Application-wide error types with appropriate HTTP status codes.
///
/// # Schema Validation
///
/// `SchemaValidation` is the only error the request-screening layer raises:
/// it signals "input does not conform to the required shape" and covers both
/// the bearer-token format check and upload body validation. It is never
/// caught or retried inside the service; it surfaces here and is translated
/// into a 400 response.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Schema validation failed: {0}")]
    SchemaValidation(String),

    #[error("Ingest pipeline unavailable: {0}")]
    Unavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body for API endpoints.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full error details server-side for debugging
        // but only expose sanitized messages to clients
        tracing::error!(error = %self, "Request failed");

        let (status, error_type, message) = match &self {
            // Client shape errors - the message is constructed by us and safe
            // to show (the expected token/body shape is public API contract)
            AppError::SchemaValidation(msg) => (
                StatusCode::BAD_REQUEST,
                "schema_validation",
                msg.to_string(),
            ),

            // The handoff queue to the downstream pipeline is closed or gone
            AppError::Unavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "unavailable",
                "Service is temporarily unable to accept uploads. Please try again later."
                    .to_string(),
            ),

            // Internal errors - never expose internal details to clients
            AppError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "config_error",
                "Service configuration error. Please contact support.".to_string(),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred. Please contact support if the issue persists."
                    .to_string(),
            ),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
