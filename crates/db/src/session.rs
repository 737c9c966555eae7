//! Per-page-load database sessions.
//!
//! [`SessionProvider`] opens a session, [`AnalyticsSession`] runs the catalog
//! queries on it and is consumed by [`AnalyticsSession::close`]. The traits
//! let the page orchestrator run against a fake executor in tests.

use std::future::Future;
use std::time::{Duration, Instant};

use autodash_core::filter::DateRange;
use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};

use crate::models::analytics::{
    CategoryDiscount, CategoryDistribution, CategoryMonthlySales, DealershipSales,
    ManufacturerRating, MonthlySales, TopSpeedEntry,
};
use crate::repositories::AnalyticsRepo;
use crate::DbConfig;

/// One open connection, scoped to a single page load.
pub trait AnalyticsSession: Send {
    /// Round-trip check used by the health endpoint.
    fn ping(&mut self) -> impl Future<Output = Result<(), sqlx::Error>> + Send;

    fn manufacturer_ratings(
        &mut self,
    ) -> impl Future<Output = Result<Vec<ManufacturerRating>, sqlx::Error>> + Send;

    fn monthly_sales(
        &mut self,
        range: DateRange,
    ) -> impl Future<Output = Result<Vec<MonthlySales>, sqlx::Error>> + Send;

    fn category_distribution(
        &mut self,
    ) -> impl Future<Output = Result<Vec<CategoryDistribution>, sqlx::Error>> + Send;

    fn top_speeds(&mut self) -> impl Future<Output = Result<Vec<TopSpeedEntry>, sqlx::Error>> + Send;

    fn dealership_sales(
        &mut self,
    ) -> impl Future<Output = Result<Vec<DealershipSales>, sqlx::Error>> + Send;

    fn category_discounts(
        &mut self,
    ) -> impl Future<Output = Result<Vec<CategoryDiscount>, sqlx::Error>> + Send;

    fn category_monthly_sales(
        &mut self,
    ) -> impl Future<Output = Result<Vec<CategoryMonthlySales>, sqlx::Error>> + Send;

    /// Release the connection. Consumes the session so it cannot be reused.
    fn close(self) -> impl Future<Output = Result<(), sqlx::Error>> + Send
    where
        Self: Sized;
}

/// Opens [`AnalyticsSession`]s.
pub trait SessionProvider: Send + Sync + 'static {
    type Session: AnalyticsSession;

    fn open(&self) -> impl Future<Output = Result<Self::Session, sqlx::Error>> + Send;
}

// ---------------------------------------------------------------------------
// PostgreSQL
// ---------------------------------------------------------------------------

/// Opens a fresh, unpooled PostgreSQL connection for every session.
#[derive(Debug, Clone)]
pub struct PgSessionProvider {
    options: PgConnectOptions,
    connect_timeout: Duration,
}

impl PgSessionProvider {
    pub fn new(config: &DbConfig) -> Self {
        Self {
            options: config.connect_options(),
            connect_timeout: config.connect_timeout,
        }
    }
}

impl SessionProvider for PgSessionProvider {
    type Session = PgSession;

    async fn open(&self) -> Result<PgSession, sqlx::Error> {
        let started = Instant::now();
        let conn = tokio::time::timeout(self.connect_timeout, PgConnection::connect_with(&self.options))
            .await
            .map_err(|_| {
                sqlx::Error::Io(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!(
                        "connecting to {}:{} timed out after {}s",
                        self.options.get_host(),
                        self.options.get_port(),
                        self.connect_timeout.as_secs()
                    ),
                ))
            })??;

        tracing::debug!(
            host = self.options.get_host(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Database session opened",
        );
        Ok(PgSession { conn })
    }
}

/// A single PostgreSQL connection running the catalog queries.
#[derive(Debug)]
pub struct PgSession {
    conn: PgConnection,
}

impl AnalyticsSession for PgSession {
    async fn ping(&mut self) -> Result<(), sqlx::Error> {
        crate::health_check(&mut self.conn).await
    }

    async fn manufacturer_ratings(&mut self) -> Result<Vec<ManufacturerRating>, sqlx::Error> {
        AnalyticsRepo::manufacturer_ratings(&mut self.conn).await
    }

    async fn monthly_sales(&mut self, range: DateRange) -> Result<Vec<MonthlySales>, sqlx::Error> {
        AnalyticsRepo::monthly_sales(&mut self.conn, &range).await
    }

    async fn category_distribution(&mut self) -> Result<Vec<CategoryDistribution>, sqlx::Error> {
        AnalyticsRepo::category_distribution(&mut self.conn).await
    }

    async fn top_speeds(&mut self) -> Result<Vec<TopSpeedEntry>, sqlx::Error> {
        AnalyticsRepo::top_speeds(&mut self.conn).await
    }

    async fn dealership_sales(&mut self) -> Result<Vec<DealershipSales>, sqlx::Error> {
        AnalyticsRepo::dealership_sales(&mut self.conn).await
    }

    async fn category_discounts(&mut self) -> Result<Vec<CategoryDiscount>, sqlx::Error> {
        AnalyticsRepo::category_discounts(&mut self.conn).await
    }

    async fn category_monthly_sales(&mut self) -> Result<Vec<CategoryMonthlySales>, sqlx::Error> {
        AnalyticsRepo::category_monthly_sales(&mut self.conn).await
    }

    async fn close(self) -> Result<(), sqlx::Error> {
        self.conn.close().await?;
        tracing::debug!("Database session closed");
        Ok(())
    }
}
