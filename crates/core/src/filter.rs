//! Sales date-range filter.
//!
//! The sidebar supplies two `YYYY-MM-DD` strings. They are parsed strictly
//! and checked for order before any connection is opened; a reversed range is
//! an error, never swapped or clamped.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::CoreError;

/// Accepted wire format for both dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Maximum accepted length of a raw date parameter.
const MAX_RAW_LEN: usize = 10;

/// Start of the range when the user has not picked one.
pub fn default_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// An inclusive `[start, end]` range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::Validation(format!(
                "start_date ({start}) must not be after end_date ({end})"
            )));
        }
        if end.succ_opt().is_none() {
            return Err(CoreError::Validation(format!(
                "end_date ({end}) is out of range"
            )));
        }
        Ok(Self { start, end })
    }

    /// Build a range from optional raw query-string values.
    ///
    /// Missing values fall back to [`default_start`] and `today`. Empty
    /// strings count as missing so an untouched HTML form works.
    pub fn from_params(
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, CoreError> {
        let start = match start.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => parse_date("start_date", raw)?,
            None => default_start(),
        };
        let end = match end.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => parse_date("end_date", raw)?,
            None => today,
        };
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// First day after the range, for half-open `>= start AND < end` bounds.
    pub fn end_exclusive(&self) -> NaiveDate {
        // `new` guarantees a successor exists.
        self.end.succ_opt().unwrap_or(self.end)
    }
}

/// Parse one date parameter in [`DATE_FORMAT`].
///
/// Anything other than ten ASCII digits-and-dashes is rejected outright, so
/// quote characters and SQL fragments never reach the database layer.
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, CoreError> {
    if raw.len() > MAX_RAW_LEN || !raw.chars().all(|c| c.is_ascii_digit() || c == '-') {
        return Err(CoreError::Validation(format!(
            "{field} must be a date in YYYY-MM-DD format"
        )));
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
        CoreError::Validation(format!("{field} is not a valid date ({raw}): {e}"))
    })
}
