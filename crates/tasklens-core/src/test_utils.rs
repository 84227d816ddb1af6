//! Shared test utilities for unit tests
//!
//! Integration tests in the root package cannot see this module because it
//! is compiled only under `#[cfg(test)]`; they carry their own copy in
//! `tests/common/mod.rs`.

use crate::error::{Result, TasklensError};
use crate::normalizer::RecordNormalizer;
use crate::types::{Dataset, Record};
use chrono::NaiveDate;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Builder for test records
pub struct RecordBuilder {
    date: Option<NaiveDate>,
    category: String,
    subcategory: String,
    minutes: f64,
    outcome: String,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self {
            date: Some(date(2023, 1, 1)),
            category: "Task A".to_string(),
            subcategory: "Sub A".to_string(),
            minutes: 30.0,
            outcome: "Result A".to_string(),
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn undated(mut self) -> Self {
        self.date = None;
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn subcategory(mut self, subcategory: &str) -> Self {
        self.subcategory = subcategory.to_string();
        self
    }

    pub fn minutes(mut self, minutes: f64) -> Self {
        self.minutes = minutes;
        self
    }

    pub fn outcome(mut self, outcome: &str) -> Self {
        self.outcome = outcome.to_string();
        self
    }

    pub fn build(self) -> Record {
        Record::new(
            self.date,
            self.category,
            self.subcategory,
            self.minutes,
            self.outcome,
        )
    }
}

impl Default for RecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalizer that hands back a prepared dataset for `.xlsx` uploads and
/// fails everything else
pub struct StubNormalizer {
    pub dataset: Dataset,
}

impl StubNormalizer {
    pub fn returning(dataset: Dataset) -> Self {
        Self { dataset }
    }
}

impl RecordNormalizer for StubNormalizer {
    fn normalize(&self, _raw_bytes: &[u8], filename: &str) -> Result<Dataset> {
        if filename.ends_with(".xlsx") {
            Ok(self.dataset.clone())
        } else if filename.ends_with(".broken.xls") {
            Err(TasklensError::RowConversion {
                row: 0,
                cause: "duration is not a time of day".to_string(),
            })
        } else {
            Err(TasklensError::UnsupportedFormat(filename.to_string()))
        }
    }
}
