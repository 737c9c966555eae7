//! Domain logic for the automotive analytics dashboard.
//!
//! Contains the query catalog identifiers, the date-range filter, the chart
//! model with its proportion math, panel insights, and the page model. The
//! `core` crate has no database dependencies; rows are mapped into charts by
//! the caller.

pub mod catalog;
pub mod chart;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod insight;
