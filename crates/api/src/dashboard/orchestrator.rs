//! Page-load orchestrator.
//!
//! Coordinates one dashboard load from start to finish:
//! 1. Open a database session (one connection, never pooled).
//! 2. Run the seven catalog queries in order, each bounded by the query
//!    timeout and by the page deadline.
//! 3. Map every result to a chart panel.
//! 4. Close the session on every path, then report the load status.
//!
//! The page deadline is four fifths of the page timeout (the HTTP request
//! timeout); the rest is left for closing the session and rendering, so the
//! load always finishes before the request is cut off.
//!
//! The date range is validated by the caller; a rejected range never gets
//! this far, so no connection is opened for it.

use std::time::{Duration, Instant};

use autodash_core::catalog::QueryId;
use autodash_core::chart::Chart;
use autodash_core::dashboard::{DashboardPage, Panel, QueryDetails};
use autodash_core::error::CoreError;
use autodash_core::filter::DateRange;
use autodash_db::repositories::analytics_repo;
use autodash_db::{AnalyticsSession, SessionProvider};

use crate::dashboard::render;

/// Upper bound on closing a session, which may follow an abandoned query.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// PostgreSQL `query_canceled`, raised when `statement_timeout` fires.
const SQLSTATE_QUERY_CANCELED: &str = "57014";

/// Runs dashboard page loads against sessions from a [`SessionProvider`].
pub struct DashboardOrchestrator<P> {
    provider: P,
    query_timeout: Duration,
    page_timeout: Duration,
}

/// A fetched result: how many rows came back and the chart built from them.
struct Fetched {
    rows: usize,
    chart: Result<Chart, String>,
}

/// How a single query attempt ended.
enum Outcome {
    Rendered(Panel),
    Failed(Panel),
    TimedOut(Panel, CoreError),
}

impl<P: SessionProvider> DashboardOrchestrator<P> {
    pub fn new(provider: P, query_timeout: Duration, page_timeout: Duration) -> Self {
        Self {
            provider,
            query_timeout,
            page_timeout,
        }
    }

    /// Load the full dashboard for `range`.
    ///
    /// Fails only when the connection cannot be established. Query, timeout
    /// and render failures are reported on the page itself, with the
    /// offending query named on its panel.
    pub async fn load(&self, range: DateRange) -> Result<DashboardPage, CoreError> {
        let started = Instant::now();
        let page_deadline = started + self.page_timeout;
        let query_deadline = started + self.query_budget();
        let mut session = self.open().await?;

        let page = self.run_queries(&mut session, range, query_deadline).await;

        let close_budget =
            CLOSE_TIMEOUT.min(page_deadline.saturating_duration_since(Instant::now()));
        self.release(session, close_budget).await;

        tracing::info!(
            start_date = %range.start(),
            end_date = %range.end(),
            success = page.status.is_success(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Dashboard page loaded",
        );
        Ok(page)
    }

    /// Open a session, run a round-trip and close it again.
    pub async fn health_check(&self) -> Result<(), CoreError> {
        let mut session = self.open().await?;
        let result = session
            .ping()
            .await
            .map_err(|e| CoreError::Connection(e.to_string()));
        self.release(session, CLOSE_TIMEOUT).await;
        result
    }

    /// Time the queries may use, out of the page timeout.
    fn query_budget(&self) -> Duration {
        self.page_timeout * 4 / 5
    }

    async fn open(&self) -> Result<P::Session, CoreError> {
        self.provider.open().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to open database session");
            CoreError::Connection(e.to_string())
        })
    }

    async fn release(&self, session: P::Session, budget: Duration) {
        match tokio::time::timeout(budget, session.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Database session did not close cleanly");
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = budget.as_millis() as u64,
                    "Timed out closing database session",
                );
            }
        }
    }

    async fn run_queries(
        &self,
        session: &mut P::Session,
        range: DateRange,
        deadline: Instant,
    ) -> DashboardPage {
        let mut panels = Vec::with_capacity(QueryId::ALL.len());
        let mut aborted: Option<(QueryId, CoreError)> = None;

        for query in QueryId::ALL {
            if aborted.is_some() {
                tracing::debug!(query = %query, "Skipping query after aborted load");
                panels.push(Panel::skipped(query));
                continue;
            }

            let panel = match self.run_query(session, query, range, deadline).await {
                Outcome::Rendered(panel) | Outcome::Failed(panel) => panel,
                Outcome::TimedOut(panel, err) => {
                    aborted = Some((query, err));
                    panel
                }
            };

            let panel = if query.uses_date_filter() {
                panel.with_details(QueryDetails {
                    sql: analytics_repo::sql(query).to_string(),
                    params: analytics_repo::bound_params(query, &range),
                })
            } else {
                panel
            };
            panels.push(panel);
        }

        DashboardPage::new(range, panels, aborted.as_ref().map(|(q, e)| (*q, e)))
    }

    async fn run_query(
        &self,
        session: &mut P::Session,
        query: QueryId,
        range: DateRange,
        deadline: Instant,
    ) -> Outcome {
        let started = Instant::now();
        let remaining = deadline.saturating_duration_since(started);
        let limit = self.query_timeout.min(remaining);
        let result = tokio::time::timeout(limit, fetch(session, query, range)).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(Fetched { rows, chart })) => match chart {
                Ok(chart) => {
                    tracing::info!(query = %query, rows, elapsed_ms, "Query completed");
                    Outcome::Rendered(Panel::from_chart(query, chart))
                }
                Err(message) => {
                    let err = CoreError::Render { query, message };
                    tracing::warn!(query = %query, rows, error = %err, "Chart rendering failed");
                    Outcome::Failed(Panel::failed(query, &err))
                }
            },
            Ok(Err(e)) if is_statement_timeout(&e) => {
                self.timed_out(query, self.query_timeout, elapsed_ms)
            }
            Ok(Err(e)) => {
                let err = CoreError::Query {
                    query,
                    message: e.to_string(),
                };
                tracing::error!(query = %query, elapsed_ms, error = %e, "Query failed");
                Outcome::Failed(Panel::failed(query, &err))
            }
            Err(_) => self.timed_out(query, limit, elapsed_ms),
        }
    }

    fn timed_out(&self, query: QueryId, limit: Duration, elapsed_ms: u64) -> Outcome {
        let err = if limit < self.query_timeout {
            CoreError::LoadDeadline {
                query,
                budget_ms: self.query_budget().as_millis() as u64,
            }
        } else {
            CoreError::QueryTimeout {
                query,
                timeout_secs: self.query_timeout.as_secs(),
            }
        };
        tracing::error!(query = %query, elapsed_ms, "Query timed out; aborting remaining queries");
        Outcome::TimedOut(Panel::failed(query, &err), err)
    }
}

/// Run one catalog query and map its rows to a chart.
async fn fetch<S: AnalyticsSession>(
    session: &mut S,
    query: QueryId,
    range: DateRange,
) -> Result<Fetched, sqlx::Error> {
    let fetched = match query {
        QueryId::ManufacturerRatings => {
            let rows = session.manufacturer_ratings().await?;
            Fetched {
                rows: rows.len(),
                chart: render::manufacturer_ratings(&rows),
            }
        }
        QueryId::MonthlySales => {
            let rows = session.monthly_sales(range).await?;
            Fetched {
                rows: rows.len(),
                chart: render::monthly_sales(&rows),
            }
        }
        QueryId::CategoryDistribution => {
            let rows = session.category_distribution().await?;
            Fetched {
                rows: rows.len(),
                chart: render::category_distribution(&rows),
            }
        }
        QueryId::TopSpeeds => {
            let rows = session.top_speeds().await?;
            Fetched {
                rows: rows.len(),
                chart: render::top_speeds(&rows),
            }
        }
        QueryId::DealershipSales => {
            let rows = session.dealership_sales().await?;
            Fetched {
                rows: rows.len(),
                chart: render::dealership_sales(&rows),
            }
        }
        QueryId::CategoryDiscounts => {
            let rows = session.category_discounts().await?;
            Fetched {
                rows: rows.len(),
                chart: render::category_discounts(&rows),
            }
        }
        QueryId::CategoryMonthlySales => {
            let rows = session.category_monthly_sales().await?;
            Fetched {
                rows: rows.len(),
                chart: render::category_monthly_sales(&rows),
            }
        }
    };
    Ok(fetched)
}

fn is_statement_timeout(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(SQLSTATE_QUERY_CANCELED),
        _ => false,
    }
}
