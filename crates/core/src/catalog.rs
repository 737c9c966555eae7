//! Identifiers for the fixed set of dashboard queries.
//!
//! The SQL text lives in `autodash-db`; this module only knows what each
//! query is called, in which order it runs, and how its result is charted.

use std::fmt;

use serde::Serialize;

use crate::chart::ChartKind;

/// The seven aggregation queries, in page order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryId {
    ManufacturerRatings,
    MonthlySales,
    CategoryDistribution,
    TopSpeeds,
    DealershipSales,
    CategoryDiscounts,
    CategoryMonthlySales,
}

impl QueryId {
    /// Execution and display order.
    pub const ALL: [QueryId; 7] = [
        QueryId::ManufacturerRatings,
        QueryId::MonthlySales,
        QueryId::CategoryDistribution,
        QueryId::TopSpeeds,
        QueryId::DealershipSales,
        QueryId::CategoryDiscounts,
        QueryId::CategoryMonthlySales,
    ];

    /// Stable snake_case identifier used in logs, JSON and DOM ids.
    pub fn slug(self) -> &'static str {
        match self {
            Self::ManufacturerRatings => "manufacturer_ratings",
            Self::MonthlySales => "monthly_sales",
            Self::CategoryDistribution => "category_distribution",
            Self::TopSpeeds => "top_speeds",
            Self::DealershipSales => "dealership_sales",
            Self::CategoryDiscounts => "category_discounts",
            Self::CategoryMonthlySales => "category_monthly_sales",
        }
    }

    /// Panel heading.
    pub fn title(self) -> &'static str {
        match self {
            Self::ManufacturerRatings => "Top 5 Manufacturers by Average Customer Rating",
            Self::MonthlySales => "Monthly Sales Trend",
            Self::CategoryDistribution => "Car Category Distribution",
            Self::TopSpeeds => "Top 5 Fastest Cars",
            Self::DealershipSales => "Top 5 Dealerships by Number of Sales",
            Self::CategoryDiscounts => "Average Discount Offered by Category",
            Self::CategoryMonthlySales => "Sales by Car Category Over Time",
        }
    }

    pub fn chart_kind(self) -> ChartKind {
        match self {
            Self::ManufacturerRatings
            | Self::TopSpeeds
            | Self::DealershipSales
            | Self::CategoryDiscounts => ChartKind::Bar,
            Self::MonthlySales | Self::CategoryMonthlySales => ChartKind::Line,
            Self::CategoryDistribution => ChartKind::Pie,
        }
    }

    /// Only the monthly sales query is bounded by the date-range filter.
    pub fn uses_date_filter(self) -> bool {
        matches!(self, Self::MonthlySales)
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
