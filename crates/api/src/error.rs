use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use calc_core::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for scheduling errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `calc_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The request body was not valid JSON for the endpoint.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// The dispatch queue is empty. A normal polling outcome, not a fault.
    #[error("No tasks available")]
    NoTaskAvailable,
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Syntax(msg) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "SYNTAX_ERROR",
                    format!("Invalid arithmetic expression: {msg}"),
                ),
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Computation(msg) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "COMPUTATION_ERROR",
                    msg.clone(),
                ),
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            },

            // --- HTTP-specific errors ---
            AppError::InvalidBody(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_BODY",
                msg.clone(),
            ),
            AppError::NoTaskAvailable => (
                StatusCode::NOT_FOUND,
                "NO_TASK",
                "No tasks available".to_string(),
            ),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
