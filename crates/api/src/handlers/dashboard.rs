//! Handlers for the analytics dashboard.
//!
//! The HTML page and the JSON endpoint share one page load path: validate
//! the sidebar filter, then hand the range to the orchestrator, which owns
//! the connection for the duration of the load.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use autodash_core::catalog::QueryId;
use autodash_core::chart::ChartKind;
use autodash_core::dashboard::DashboardPage;
use autodash_core::error::CoreError;
use autodash_db::repositories::analytics_repo;
use autodash_db::SessionProvider;
use chrono::Utc;
use serde::Serialize;

use crate::dashboard::template::DashboardTemplate;
use crate::error::AppResult;
use crate::query::DateRangeParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// One entry of the query catalog.
#[derive(Debug, Serialize)]
pub struct QueryInfo {
    pub id: QueryId,
    pub title: &'static str,
    pub chart_kind: ChartKind,
    pub uses_date_filter: bool,
    pub sql: &'static str,
    pub params: &'static [&'static str],
}

impl QueryInfo {
    fn for_query(query: QueryId) -> Self {
        Self {
            id: query,
            title: query.title(),
            chart_kind: query.chart_kind(),
            uses_date_filter: query.uses_date_filter(),
            sql: analytics_repo::sql(query),
            params: analytics_repo::param_names(query),
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Unwrap the sidebar parameters, turning a malformed query string (such as
/// a repeated `start_date`) into a validation error.
fn filter_params(
    params: Result<Query<DateRangeParams>, QueryRejection>,
) -> Result<DateRangeParams, CoreError> {
    params.map(|Query(params)| params).map_err(|rejection| {
        CoreError::Validation(format!("Invalid filter parameters: {}", rejection.body_text()))
    })
}

/// GET / -- the server-rendered dashboard.
///
/// A rejected filter re-renders the form with the message (400) and no
/// connection is opened. A failed connection renders the form with an
/// error banner (503). Query failures still render the page (200) with the
/// affected panels marked.
pub async fn dashboard_page<P: SessionProvider>(
    State(state): State<AppState<P>>,
    params: Result<Query<DateRangeParams>, QueryRejection>,
) -> AppResult<Response> {
    let params = match filter_params(params) {
        Ok(params) => params,
        Err(err) => return reprompt(&DateRangeParams::default(), &err),
    };
    let range = match params.to_range() {
        Ok(range) => range,
        Err(err) => return reprompt(&params, &err),
    };

    match state.orchestrator.load(range).await {
        Ok(page) => {
            let html = DashboardTemplate::from_page(&page)?.render_html()?;
            Ok(Html(html).into_response())
        }
        Err(CoreError::Connection(_)) => {
            let html = DashboardTemplate::connection_failed(&params, Utc::now().date_naive())
                .render_html()?;
            Ok((StatusCode::SERVICE_UNAVAILABLE, Html(html)).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

fn reprompt(params: &DateRangeParams, err: &CoreError) -> AppResult<Response> {
    tracing::warn!(error = %err, "Rejected dashboard filter");
    let html = DashboardTemplate::invalid_filter(params, err).render_html()?;
    Ok((StatusCode::BAD_REQUEST, Html(html)).into_response())
}

/// GET /api/v1/dashboard -- the page model as JSON.
pub async fn dashboard_data<P: SessionProvider>(
    State(state): State<AppState<P>>,
    params: Result<Query<DateRangeParams>, QueryRejection>,
) -> AppResult<Json<DataResponse<DashboardPage>>> {
    let range = filter_params(params)
        .and_then(|params| params.to_range())
        .inspect_err(|err| {
            tracing::warn!(error = %err, "Rejected dashboard filter");
        })?;
    let page = state.orchestrator.load(range).await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/dashboard/queries -- the query catalog in execution order.
pub async fn query_catalog() -> Json<DataResponse<Vec<QueryInfo>>> {
    let data = QueryId::ALL.into_iter().map(QueryInfo::for_query).collect();
    Json(DataResponse { data })
}
