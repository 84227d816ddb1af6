//! Date-range filtering for datasets
//!
//! Both bounds are inclusive and optional. With no bound the filter is the
//! identity; with at least one bound, records without a date are dropped
//! because they cannot be placed on the calendar.
//!
//! # Examples
//!
//! ```
//! use tasklens_core::filters::DateRange;
//! use chrono::NaiveDate;
//!
//! // January 2023
//! let range = DateRange::between(
//!     NaiveDate::from_ymd_opt(2023, 1, 1),
//!     NaiveDate::from_ymd_opt(2023, 1, 31),
//! );
//! assert!(!range.is_unbounded());
//! ```

use crate::error::{Result, TasklensError};
use crate::types::{Dataset, Record};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Inclusive date range used to restrict a dataset
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Start date (inclusive)
    pub start: Option<NaiveDate>,
    /// End date (inclusive)
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Create a range with no bounds
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a range from optional bounds
    pub fn between(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// True when neither bound is set
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// True when the bounds exclude every possible date
    pub fn is_inverted(&self) -> bool {
        matches!((self.start, self.end), (Some(start), Some(end)) if start > end)
    }

    /// Check if a record passes the range
    pub fn matches(&self, record: &Record) -> bool {
        if self.is_unbounded() {
            return true;
        }

        let Some(date) = record.date else {
            return false;
        };

        if let Some(start) = self.start
            && date < start
        {
            return false;
        }

        if let Some(end) = self.end
            && date > end
        {
            return false;
        }

        true
    }

    /// Restrict a dataset to the range, keeping record order
    pub fn apply(&self, dataset: &Dataset) -> Dataset {
        if self.is_unbounded() {
            return dataset.clone();
        }
        if self.is_inverted() {
            debug!("Date range {:?} is inverted, nothing matches", self);
            return Dataset::empty();
        }

        dataset.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Restrict `dataset` to records dated within `[start, end]`
///
/// Returns an unchanged copy when both bounds are absent. An inverted range
/// (`start > end`) yields an empty dataset rather than an error.
pub fn filter_by_date(
    dataset: &Dataset,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Dataset {
    DateRange::between(start, end).apply(dataset)
}

/// Parse an ISO-8601 calendar date (`YYYY-MM-DD`)
///
/// Blank input counts as "no bound" and yields `Ok(None)`.
pub fn parse_iso_date(input: &str) -> Result<Option<NaiveDate>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| {
            TasklensError::InvalidDate(format!(
                "Invalid date format '{trimmed}', expected YYYY-MM-DD"
            ))
        })
}
