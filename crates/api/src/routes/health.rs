use axum::extract::State;
use axum::{routing::get, Json, Router};
use autodash_db::SessionProvider;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database accepts connections.
    pub db_healthy: bool,
}

/// GET /health -- returns service and database health.
///
/// Opens a dedicated connection, pings it and closes it again.
async fn health_check<P: SessionProvider>(
    State(state): State<AppState<P>>,
) -> Json<HealthResponse> {
    let db_healthy = state.orchestrator.health_check().await.is_ok();

    let status = if db_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router<P: SessionProvider>() -> Router<AppState<P>> {
    Router::new().route("/health", get(health_check::<P>))
}
