//! Row → chart mapping for each catalog query.
//!
//! Every function keeps the row order produced by the SQL so chart axes
//! render in the intended sequence. Errors describe a malformed result shape
//! and become render errors on the owning panel.

use autodash_core::chart::{BarChart, Chart, LineChart, PieChart};
use autodash_db::models::analytics::{
    CategoryDiscount, CategoryDistribution, CategoryMonthlySales, DealershipSales,
    ManufacturerRating, MonthlySales, TopSpeedEntry,
};

pub fn manufacturer_ratings(rows: &[ManufacturerRating]) -> Result<Chart, String> {
    BarChart::new(
        "Manufacturer",
        "Average rating",
        rows.iter()
            .map(|r| (r.manufacturer_name.clone(), r.avg_rating)),
    )
    .map(Chart::Bar)
}

pub fn monthly_sales(rows: &[MonthlySales]) -> Result<Chart, String> {
    LineChart::single(
        "Month",
        "Total sales",
        "Sales",
        rows.iter().map(|r| (r.sale_month, r.total_sales as f64)),
    )
    .map(Chart::Line)
}

pub fn category_distribution(rows: &[CategoryDistribution]) -> Result<Chart, String> {
    PieChart::from_amounts(
        rows.iter()
            .map(|r| (r.category.clone(), r.total_models as f64)),
    )
    .map(Chart::Pie)
}

pub fn top_speeds(rows: &[TopSpeedEntry]) -> Result<Chart, String> {
    BarChart::new(
        "Model",
        "Top speed",
        rows.iter().map(|r| (r.model_name.clone(), r.top_speed)),
    )
    .map(Chart::Bar)
}

pub fn dealership_sales(rows: &[DealershipSales]) -> Result<Chart, String> {
    BarChart::new(
        "Dealership",
        "Total sales",
        rows.iter()
            .map(|r| (r.dealership_name.clone(), r.total_sales as f64)),
    )
    .map(Chart::Bar)
}

pub fn category_discounts(rows: &[CategoryDiscount]) -> Result<Chart, String> {
    BarChart::new(
        "Category",
        "Average discount",
        rows.iter().map(|r| (r.category.clone(), r.avg_discount)),
    )
    .map(Chart::Bar)
}

pub fn category_monthly_sales(rows: &[CategoryMonthlySales]) -> Result<Chart, String> {
    LineChart::grouped(
        "Month",
        "Total sales",
        rows.iter()
            .map(|r| (r.sale_month, r.category.clone(), r.total_sales as f64)),
    )
    .map(Chart::Line)
}
