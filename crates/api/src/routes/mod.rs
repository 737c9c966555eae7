pub mod dashboard;
pub mod health;

use axum::Router;
use autodash_db::SessionProvider;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /dashboard                     page model for ?start_date=&end_date=
/// /dashboard/queries             query catalog
/// ```
pub fn api_routes<P: SessionProvider>() -> Router<AppState<P>> {
    Router::new().nest("/dashboard", dashboard::router())
}
