// =============================================================================
// ERROR MODULE
// =============================================================================
// Custom error types and their HTTP responses.
//
// The two builders surface exactly two failure classes: a validation failure
// raised before any query runs, and a data-access failure propagated
// unchanged from the driver. The detail endpoint adds not-found on top.
// =============================================================================

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

#[derive(Debug, Error)]
pub enum AppError {
    /// Database query failed; never recovered locally, never retried.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid sort field or direction in the listing path.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Requested row does not exist.
    #[error("Item not found: {0}")]
    NotFound(String),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

// Converting AppError into an HTTP response lets handlers return
// Result<Json<T>, AppError> directly.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
            }

            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),

            // Driver details stay out of the response body.
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "A database error occurred".to_string(),
            ),

            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        };

        tracing::error!(
            error_code = error_code,
            error = %self,
            "Request failed"
        );

        let body = ErrorResponse::new(error_code, message);
        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
