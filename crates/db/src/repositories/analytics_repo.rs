//! Repository for the seven dashboard aggregation queries.
//!
//! Only the monthly sales query takes input, and its dates are always sent
//! as bound parameters (`$1`, `$2`). Ordering and `LIMIT` live in the SQL so
//! chart axes come back in display order.

use autodash_core::catalog::QueryId;
use autodash_core::filter::DateRange;
use sqlx::PgConnection;

use crate::models::analytics::{
    CategoryDiscount, CategoryDistribution, CategoryMonthlySales, DealershipSales,
    ManufacturerRating, MonthlySales, TopSpeedEntry,
};

/// Fallback label for car models without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

const MANUFACTURER_RATINGS_SQL: &str = "\
SELECT m.name AS manufacturer_name, AVG(r.rating)::float8 AS avg_rating
FROM reviews r
JOIN car_model cm ON r.model_id = cm.model_id
JOIN manufacturer m ON cm.manufacturer_id = m.manufacturer_id
WHERE r.rating IS NOT NULL
GROUP BY m.name
ORDER BY avg_rating DESC, m.name
LIMIT 5";

const MONTHLY_SALES_SQL: &str = "\
SELECT DATE_TRUNC('month', s.sale_date)::date AS sale_month, COUNT(*) AS total_sales
FROM sales s
WHERE s.sale_date >= $1 AND s.sale_date < $2
GROUP BY sale_month
ORDER BY sale_month";

const CATEGORY_DISTRIBUTION_SQL: &str = "\
SELECT COALESCE(cm.category, 'Uncategorized') AS category, COUNT(*) AS total_models
FROM car_model cm
GROUP BY COALESCE(cm.category, 'Uncategorized')
ORDER BY total_models DESC, category";

const TOP_SPEEDS_SQL: &str = "\
SELECT cm.model_name, p.top_speed::float8 AS top_speed
FROM performance p
JOIN car_model cm ON p.model_id = cm.model_id
WHERE p.top_speed IS NOT NULL
ORDER BY p.top_speed DESC, cm.model_name
LIMIT 5";

const DEALERSHIP_SALES_SQL: &str = "\
SELECT d.name AS dealership_name, COUNT(*) AS total_sales
FROM sales s
JOIN dealership d ON s.dealership_id = d.dealership_id
GROUP BY d.name
ORDER BY total_sales DESC, d.name
LIMIT 5";

const CATEGORY_DISCOUNTS_SQL: &str = "\
SELECT COALESCE(cm.category, 'Uncategorized') AS category, AVG(p.discount)::float8 AS avg_discount
FROM pricing p
JOIN car_model cm ON p.model_id = cm.model_id
WHERE p.discount IS NOT NULL
GROUP BY COALESCE(cm.category, 'Uncategorized')
ORDER BY avg_discount DESC, category";

const CATEGORY_MONTHLY_SALES_SQL: &str = "\
SELECT DATE_TRUNC('month', s.sale_date)::date AS sale_month,
       COALESCE(cm.category, 'Uncategorized') AS category,
       COUNT(*) AS total_sales
FROM sales s
JOIN car_model cm ON s.model_id = cm.model_id
WHERE s.sale_date IS NOT NULL
GROUP BY sale_month, COALESCE(cm.category, 'Uncategorized')
ORDER BY sale_month, category";

/// SQL text of a catalog query, as sent to the server.
pub fn sql(query: QueryId) -> &'static str {
    match query {
        QueryId::ManufacturerRatings => MANUFACTURER_RATINGS_SQL,
        QueryId::MonthlySales => MONTHLY_SALES_SQL,
        QueryId::CategoryDistribution => CATEGORY_DISTRIBUTION_SQL,
        QueryId::TopSpeeds => TOP_SPEEDS_SQL,
        QueryId::DealershipSales => DEALERSHIP_SALES_SQL,
        QueryId::CategoryDiscounts => CATEGORY_DISCOUNTS_SQL,
        QueryId::CategoryMonthlySales => CATEGORY_MONTHLY_SALES_SQL,
    }
}

/// Names of the values bound to `$1`, `$2`, ... for a query.
pub fn param_names(query: QueryId) -> &'static [&'static str] {
    match query {
        QueryId::MonthlySales => &["start_date", "day after end_date"],
        _ => &[],
    }
}

/// Human-readable bound values for a query, in placeholder order.
pub fn bound_params(query: QueryId, range: &DateRange) -> Vec<String> {
    match query {
        QueryId::MonthlySales => vec![
            format!("$1 = {} (start_date)", range.start()),
            format!("$2 = {} (day after end_date)", range.end_exclusive()),
        ],
        _ => Vec::new(),
    }
}

/// Provides the dashboard's read-only aggregation queries.
pub struct AnalyticsRepo;

impl AnalyticsRepo {
    /// Top 5 manufacturers by average customer rating.
    pub async fn manufacturer_ratings(
        conn: &mut PgConnection,
    ) -> Result<Vec<ManufacturerRating>, sqlx::Error> {
        sqlx::query_as::<_, ManufacturerRating>(MANUFACTURER_RATINGS_SQL)
            .fetch_all(conn)
            .await
    }

    /// Sales per month within `range` (inclusive of both end days).
    pub async fn monthly_sales(
        conn: &mut PgConnection,
        range: &DateRange,
    ) -> Result<Vec<MonthlySales>, sqlx::Error> {
        sqlx::query_as::<_, MonthlySales>(MONTHLY_SALES_SQL)
            .bind(range.start())
            .bind(range.end_exclusive())
            .fetch_all(conn)
            .await
    }

    /// Number of models per category, largest first.
    pub async fn category_distribution(
        conn: &mut PgConnection,
    ) -> Result<Vec<CategoryDistribution>, sqlx::Error> {
        sqlx::query_as::<_, CategoryDistribution>(CATEGORY_DISTRIBUTION_SQL)
            .fetch_all(conn)
            .await
    }

    /// The 5 fastest models.
    pub async fn top_speeds(conn: &mut PgConnection) -> Result<Vec<TopSpeedEntry>, sqlx::Error> {
        sqlx::query_as::<_, TopSpeedEntry>(TOP_SPEEDS_SQL)
            .fetch_all(conn)
            .await
    }

    /// Top 5 dealerships by number of sales.
    pub async fn dealership_sales(
        conn: &mut PgConnection,
    ) -> Result<Vec<DealershipSales>, sqlx::Error> {
        sqlx::query_as::<_, DealershipSales>(DEALERSHIP_SALES_SQL)
            .fetch_all(conn)
            .await
    }

    /// Average discount per category, deepest first.
    pub async fn category_discounts(
        conn: &mut PgConnection,
    ) -> Result<Vec<CategoryDiscount>, sqlx::Error> {
        sqlx::query_as::<_, CategoryDiscount>(CATEGORY_DISCOUNTS_SQL)
            .fetch_all(conn)
            .await
    }

    /// Sales per month and category over the whole history.
    pub async fn category_monthly_sales(
        conn: &mut PgConnection,
    ) -> Result<Vec<CategoryMonthlySales>, sqlx::Error> {
        sqlx::query_as::<_, CategoryMonthlySales>(CATEGORY_MONTHLY_SALES_SQL)
            .fetch_all(conn)
            .await
    }
}
