//! Route definitions for the analytics dashboard.

use axum::routing::get;
use axum::Router;
use autodash_db::SessionProvider;

use crate::handlers::dashboard;
use crate::state::AppState;

/// The HTML dashboard, mounted at the root.
///
/// ```text
/// GET  /            -> dashboard_page
/// ```
pub fn page_router<P: SessionProvider>() -> Router<AppState<P>> {
    Router::new().route("/", get(dashboard::dashboard_page::<P>))
}

/// JSON routes mounted at `/api/v1/dashboard`.
///
/// ```text
/// GET  /            -> dashboard_data
/// GET  /queries     -> query_catalog
/// ```
pub fn router<P: SessionProvider>() -> Router<AppState<P>> {
    Router::new()
        .route("/", get(dashboard::dashboard_data::<P>))
        .route("/queries", get(dashboard::query_catalog))
}
