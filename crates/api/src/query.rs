//! Shared query parameter types for API handlers.

use autodash_core::error::CoreError;
use autodash_core::filter::DateRange;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

/// Sidebar filter parameters (`?start_date=&end_date=`).
///
/// Kept as raw strings so that malformed input reaches the validator and
/// produces a `VALIDATION_ERROR` instead of a generic extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl DateRangeParams {
    /// Validate into a [`DateRange`], defaulting the end to today (UTC).
    pub fn to_range(&self) -> Result<DateRange, CoreError> {
        self.to_range_at(Utc::now().date_naive())
    }

    pub fn to_range_at(&self, today: NaiveDate) -> Result<DateRange, CoreError> {
        DateRange::from_params(self.start_date.as_deref(), self.end_date.as_deref(), today)
    }
}
