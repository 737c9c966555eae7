//! Row shapes returned by the dashboard aggregation queries.
//!
//! Rows are transient: they live for a single page load and are never
//! written back.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

/// Average review rating per manufacturer.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ManufacturerRating {
    pub manufacturer_name: String,
    pub avg_rating: f64,
}

/// Number of sales in one calendar month.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct MonthlySales {
    /// First day of the month.
    pub sale_month: NaiveDate,
    pub total_sales: i64,
}

/// Number of car models in one category.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct CategoryDistribution {
    pub category: String,
    pub total_models: i64,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct TopSpeedEntry {
    pub model_name: String,
    pub top_speed: f64,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct DealershipSales {
    pub dealership_name: String,
    pub total_sales: i64,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct CategoryDiscount {
    pub category: String,
    pub avg_discount: f64,
}

/// Number of sales per calendar month and category.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct CategoryMonthlySales {
    pub sale_month: NaiveDate,
    pub category: String,
    pub total_sales: i64,
}
