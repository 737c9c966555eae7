//! Shared helpers for the api integration tests.
//!
//! [`FakeProvider`] stands in for PostgreSQL: it serves canned rows, can be
//! told to refuse connections, fail or stall individual queries, and counts
//! every open, close and query so tests can check connection handling.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use chrono::{Datelike, NaiveDate};
use http_body_util::BodyExt;
use tower::ServiceExt;

use autodash_api::config::ServerConfig;
use autodash_api::router::build_app_router;
use autodash_api::state::AppState;
use autodash_core::catalog::QueryId;
use autodash_core::filter::DateRange;
use autodash_db::models::analytics::{
    CategoryDiscount, CategoryDistribution, CategoryMonthlySales, DealershipSales,
    ManufacturerRating, MonthlySales, TopSpeedEntry,
};
use autodash_db::{AnalyticsSession, SessionProvider};

// ---------------------------------------------------------------------------
// Fixture data
// ---------------------------------------------------------------------------

/// Rows served by the fake database, one list per catalog query.
#[derive(Debug, Clone, Default)]
pub struct Rows {
    pub ratings: Vec<ManufacturerRating>,
    pub monthly: Vec<MonthlySales>,
    pub distribution: Vec<CategoryDistribution>,
    pub speeds: Vec<TopSpeedEntry>,
    pub dealerships: Vec<DealershipSales>,
    pub discounts: Vec<CategoryDiscount>,
    pub category_monthly: Vec<CategoryMonthlySales>,
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Whether a month bucket (first day of month) overlaps `range`, the way the
/// `date_trunc` grouping in the monthly sales query buckets rows.
fn overlaps_month(range: &DateRange, month_start: NaiveDate) -> bool {
    let month_floor = range.start().with_day0(0).unwrap_or(range.start());
    month_start >= month_floor && month_start <= range.end()
}

/// A small but complete data set touching every query.
pub fn sample_rows() -> Rows {
    Rows {
        ratings: vec![
            ManufacturerRating {
                manufacturer_name: "Toyota".into(),
                avg_rating: 4.5,
            },
            ManufacturerRating {
                manufacturer_name: "Ford".into(),
                avg_rating: 3.9,
            },
        ],
        monthly: vec![
            MonthlySales {
                sale_month: date(2023, 1, 1),
                total_sales: 4,
            },
            MonthlySales {
                sale_month: date(2023, 2, 1),
                total_sales: 9,
            },
            MonthlySales {
                sale_month: date(2024, 6, 1),
                total_sales: 2,
            },
        ],
        distribution: vec![
            CategoryDistribution {
                category: "SUV".into(),
                total_models: 1,
            },
            CategoryDistribution {
                category: "Sedan".into(),
                total_models: 1,
            },
            CategoryDistribution {
                category: "Coupe".into(),
                total_models: 1,
            },
        ],
        speeds: vec![TopSpeedEntry {
            model_name: "Mustang".into(),
            top_speed: 250.0,
        }],
        dealerships: vec![DealershipSales {
            dealership_name: "Northside".into(),
            total_sales: 12,
        }],
        discounts: vec![CategoryDiscount {
            category: "Sedan".into(),
            avg_discount: 1500.0,
        }],
        category_monthly: vec![
            CategoryMonthlySales {
                sale_month: date(2023, 1, 1),
                category: "Coupe".into(),
                total_sales: 1,
            },
            CategoryMonthlySales {
                sale_month: date(2023, 1, 1),
                category: "Sedan".into(),
                total_sales: 3,
            },
        ],
    }
}

// ---------------------------------------------------------------------------
// Fake provider
// ---------------------------------------------------------------------------

/// Counters shared between the fake provider and the test body.
#[derive(Debug, Default)]
pub struct Counters {
    pub opens: AtomicUsize,
    pub closes: AtomicUsize,
    pub executed: Mutex<Vec<QueryId>>,
    pub monthly_range: Mutex<Option<DateRange>>,
}

impl Counters {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn executed(&self) -> Vec<QueryId> {
        self.executed.lock().unwrap().clone()
    }
}

#[derive(Debug, Default)]
struct Behaviour {
    rows: Rows,
    refuse_connections: bool,
    failing: Vec<QueryId>,
    stalled: Vec<(QueryId, Duration)>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeProvider {
    behaviour: Arc<Behaviour>,
    pub counters: Arc<Counters>,
}

impl FakeProvider {
    pub fn with_rows(rows: Rows) -> Self {
        Self::build(Behaviour {
            rows,
            ..Behaviour::default()
        })
    }

    pub fn refusing_connections() -> Self {
        Self::build(Behaviour {
            refuse_connections: true,
            ..Behaviour::default()
        })
    }

    pub fn failing(rows: Rows, failing: Vec<QueryId>) -> Self {
        Self::build(Behaviour {
            rows,
            failing,
            ..Behaviour::default()
        })
    }

    pub fn stalling(rows: Rows, query: QueryId, delay: Duration) -> Self {
        Self::build(Behaviour {
            rows,
            stalled: vec![(query, delay)],
            ..Behaviour::default()
        })
    }

    fn build(behaviour: Behaviour) -> Self {
        Self {
            behaviour: Arc::new(behaviour),
            counters: Arc::new(Counters::default()),
        }
    }
}

impl SessionProvider for FakeProvider {
    type Session = FakeSession;

    async fn open(&self) -> Result<FakeSession, sqlx::Error> {
        if self.behaviour.refuse_connections {
            return Err(sqlx::Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )));
        }
        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        Ok(FakeSession {
            behaviour: Arc::clone(&self.behaviour),
            counters: Arc::clone(&self.counters),
        })
    }
}

pub struct FakeSession {
    behaviour: Arc<Behaviour>,
    counters: Arc<Counters>,
}

impl FakeSession {
    async fn serve<T: Clone + Send + Sync>(
        &self,
        query: QueryId,
        rows: &[T],
    ) -> Result<Vec<T>, sqlx::Error> {
        self.counters.executed.lock().unwrap().push(query);

        let delay = self
            .behaviour
            .stalled
            .iter()
            .find(|(q, _)| *q == query)
            .map(|(_, d)| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.behaviour.failing.contains(&query) {
            return Err(sqlx::Error::Protocol(format!(
                "relation backing {query} does not exist"
            )));
        }
        Ok(rows.to_vec())
    }
}

impl AnalyticsSession for FakeSession {
    async fn ping(&mut self) -> Result<(), sqlx::Error> {
        Ok(())
    }

    async fn manufacturer_ratings(&mut self) -> Result<Vec<ManufacturerRating>, sqlx::Error> {
        let rows = self.behaviour.rows.ratings.clone();
        self.serve(QueryId::ManufacturerRatings, &rows).await
    }

    async fn monthly_sales(&mut self, range: DateRange) -> Result<Vec<MonthlySales>, sqlx::Error> {
        *self.counters.monthly_range.lock().unwrap() = Some(range);
        let rows: Vec<_> = self
            .behaviour
            .rows
            .monthly
            .iter()
            .filter(|r| overlaps_month(&range, r.sale_month))
            .cloned()
            .collect();
        self.serve(QueryId::MonthlySales, &rows).await
    }

    async fn category_distribution(&mut self) -> Result<Vec<CategoryDistribution>, sqlx::Error> {
        let rows = self.behaviour.rows.distribution.clone();
        self.serve(QueryId::CategoryDistribution, &rows).await
    }

    async fn top_speeds(&mut self) -> Result<Vec<TopSpeedEntry>, sqlx::Error> {
        let rows = self.behaviour.rows.speeds.clone();
        self.serve(QueryId::TopSpeeds, &rows).await
    }

    async fn dealership_sales(&mut self) -> Result<Vec<DealershipSales>, sqlx::Error> {
        let rows = self.behaviour.rows.dealerships.clone();
        self.serve(QueryId::DealershipSales, &rows).await
    }

    async fn category_discounts(&mut self) -> Result<Vec<CategoryDiscount>, sqlx::Error> {
        let rows = self.behaviour.rows.discounts.clone();
        self.serve(QueryId::CategoryDiscounts, &rows).await
    }

    async fn category_monthly_sales(&mut self) -> Result<Vec<CategoryMonthlySales>, sqlx::Error> {
        let rows = self.behaviour.rows.category_monthly.clone();
        self.serve(QueryId::CategoryMonthlySales, &rows).await
    }

    async fn close(self) -> Result<(), sqlx::Error> {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// App helpers
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        port: 0,
        request_timeout_secs: 30,
        ..ServerConfig::default()
    }
}

/// Build the full application router around `provider`, with the same
/// middleware stack production uses.
pub fn build_test_app(provider: FakeProvider) -> Router {
    build_test_app_with(test_config(), provider)
}

pub fn build_test_app_with(config: ServerConfig, provider: FakeProvider) -> Router {
    build_app_router(AppState::new(config, provider))
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}
