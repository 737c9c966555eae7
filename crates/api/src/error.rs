use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use autodash_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`], which already carries every failure a page load can
/// produce. Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `autodash_core`.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// HTTP status, machine-readable code and client-facing message.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        let AppError::Core(core) = self;
        match core {
            CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            CoreError::Connection(msg) => {
                tracing::error!(error = %msg, "Database connection failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "CONNECTION_ERROR",
                    "Could not connect to the database".to_string(),
                )
            }
            CoreError::Query { .. }
            | CoreError::QueryTimeout { .. }
            | CoreError::LoadDeadline { .. } => {
                tracing::error!(query = ?core.query(), error = %core, "Query failed");
                (StatusCode::BAD_GATEWAY, "QUERY_ERROR", core.to_string())
            }
            CoreError::Render { .. } => {
                tracing::error!(query = ?core.query(), error = %core, "Render failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "RENDER_ERROR", core.to_string())
            }
            CoreError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal core error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
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
