//! Core domain types for tasklens
//!
//! A [`Record`] is one time-tracking entry and a [`Dataset`] is an ordered,
//! immutable collection of them. Durations are always stored as elapsed
//! minutes; sources that encode a duration as a time of day go through
//! [`TimeOfDay`] exactly once on the way in.

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of a dataset activation within a session
///
/// A fresh id is minted every time a dataset becomes active, so renderers can
/// tell a dataset swap apart from a filter change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetId(Uuid);

impl DatasetId {
    /// Mint a new random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DatasetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A duration written as a clock reading (hours and minutes since midnight)
///
/// Spreadsheets commonly store elapsed time as a time-of-day cell. This type
/// is the only way such a value turns into elapsed minutes.
///
/// # Examples
/// ```
/// use tasklens_core::types::TimeOfDay;
///
/// let t = TimeOfDay::new(1, 30).unwrap();
/// assert_eq!(t.to_elapsed_minutes(), 90.0);
/// assert!(TimeOfDay::new(24, 0).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay {
    hour: u32,
    minute: u32,
}

impl TimeOfDay {
    /// Create a time of day, rejecting out-of-range components
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Elapsed minutes: `hour * 60 + minute` (seconds are dropped)
    pub fn to_elapsed_minutes(&self) -> f64 {
        f64::from(self.hour * 60 + self.minute)
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(time: NaiveTime) -> Self {
        Self {
            hour: time.hour(),
            minute: time.minute(),
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// One time-tracking entry
///
/// `date` is `None` when the source cell could not be read as a date; such
/// records only show up while no date range is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Calendar day of the entry
    pub date: Option<NaiveDate>,
    /// Task category (業務内容)
    pub category: String,
    /// Subcategory within the task category
    pub subcategory: String,
    /// Elapsed time in minutes, never negative
    pub duration_minutes: f64,
    /// Free-text outcome of the work
    pub outcome: String,
}

impl Record {
    /// Create a record from an already-normalized duration in minutes
    ///
    /// Negative or non-finite durations are clamped to zero.
    pub fn new(
        date: Option<NaiveDate>,
        category: impl Into<String>,
        subcategory: impl Into<String>,
        duration_minutes: f64,
        outcome: impl Into<String>,
    ) -> Self {
        let duration_minutes = if duration_minutes.is_finite() && duration_minutes > 0.0 {
            duration_minutes
        } else {
            0.0
        };

        Self {
            date,
            category: category.into(),
            subcategory: subcategory.into(),
            duration_minutes,
            outcome: outcome.into(),
        }
    }

    /// Create a record whose duration was recorded as a time of day
    pub fn from_time_of_day(
        date: Option<NaiveDate>,
        category: impl Into<String>,
        subcategory: impl Into<String>,
        duration: TimeOfDay,
        outcome: impl Into<String>,
    ) -> Self {
        Self::new(
            date,
            category,
            subcategory,
            duration.to_elapsed_minutes(),
            outcome,
        )
    }
}

/// Ordered, immutable collection of records
///
/// Order is irrelevant to aggregation totals but is kept for table display
/// and for the first-seen ordering of aggregation keys.
///
/// # Examples
/// ```
/// use tasklens_core::types::{Dataset, Record};
///
/// let dataset: Dataset = vec![
///     Record::new(None, "Task A", "Sub A", 30.0, "done"),
///     Record::new(None, "Task B", "Sub A", 15.0, "done"),
///     Record::new(None, "Task A", "Sub B", 10.0, "done"),
/// ]
/// .into_iter()
/// .collect();
///
/// assert_eq!(dataset.len(), 3);
/// assert_eq!(dataset.categories(), vec!["Task A", "Task B"]);
/// assert_eq!(dataset.total_minutes(), 55.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of all durations in minutes
    pub fn total_minutes(&self) -> f64 {
        self.records.iter().map(|r| r.duration_minutes).sum()
    }

    /// Distinct non-empty categories in first-seen order
    pub fn categories(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.records
            .iter()
            .filter(|r| !r.category.is_empty())
            .filter(|r| seen.insert(r.category.as_str()))
            .map(|r| r.category.clone())
            .collect()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl FromIterator<Record> for Dataset {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
