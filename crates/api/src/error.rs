use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bidtrack_core::error::CoreError;
use serde_json::json;

/// PostgreSQL SQLSTATE codes the API distinguishes.
mod sqlstate {
    pub const UNIQUE_VIOLATION: &str = "23505";
    pub const CHECK_VIOLATION: &str = "23514";
    pub const SERIALIZATION_FAILURE: &str = "40001";
    pub const DEADLOCK_DETECTED: &str = "40P01";
    pub const LOCK_NOT_AVAILABLE: &str = "55P03";
}

/// Message returned for every 500. Details only go to the log.
const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce `{ "error": ..., "code": ... }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The request body could not be read as the expected JSON.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Status, machine-readable code and caller-visible message.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Core(CoreError::Internal(detail)) => {
                tracing::error!(error = %detail, "Internal error");
                internal()
            }
            AppError::Core(core @ CoreError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", core.to_string())
            }
            AppError::Core(core @ CoreError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", core.to_string())
            }
            AppError::Core(core @ CoreError::Unauthorized(_)) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", core.to_string())
            }
            AppError::Core(core @ CoreError::Forbidden(_)) => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", core.to_string())
            }
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let body = json!({
            "error": message,
            "code": code,
        });
        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique and check constraint violations map to 409 and 400.
/// - Lock contention between concurrent bid edits maps to 409 so the client
///   can retry.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some(sqlstate::UNIQUE_VIOLATION) => (
                StatusCode::CONFLICT,
                "CONFLICT",
                format!(
                    "Duplicate value violates unique constraint: {}",
                    db_err.constraint().unwrap_or("unknown")
                ),
            ),
            Some(sqlstate::CHECK_VIOLATION) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                format!(
                    "Value rejected by constraint: {}",
                    db_err.constraint().unwrap_or("unknown")
                ),
            ),
            Some(
                sqlstate::SERIALIZATION_FAILURE
                | sqlstate::DEADLOCK_DETECTED
                | sqlstate::LOCK_NOT_AVAILABLE,
            ) => {
                tracing::warn!(error = %db_err, "Concurrent bid modification");
                (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    "The bid was modified concurrently. Please retry.".to_string(),
                )
            }
            _ => {
                tracing::error!(error = %db_err, "Database error");
                internal()
            }
        },
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}
