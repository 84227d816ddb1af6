//! Common test utilities and helpers for tasklens tests
//!
//! This module provides record builders, dataset helpers and a stub
//! normalizer so integration tests can drive sessions without spreadsheets.

#![allow(dead_code)]

use chrono::NaiveDate;
use std::path::PathBuf;
use tasklens::{Dataset, Record, RecordNormalizer, Result, TasklensError};

/// Directory holding the workbook fixtures
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Builder for creating test Record instances
pub struct RecordBuilder {
    date: Option<NaiveDate>,
    category: String,
    subcategory: String,
    minutes: f64,
    outcome: String,
}

impl RecordBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            date: Some(date(2024, 3, 1)),
            category: "Writing".to_string(),
            subcategory: "Draft".to_string(),
            minutes: 30.0,
            outcome: "Done".to_string(),
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

/// A week of entries across two categories, one of them undated
pub fn week_dataset() -> Dataset {
    vec![
        RecordBuilder::new().on(date(2024, 3, 1)).minutes(90.0).build(),
        RecordBuilder::new()
            .on(date(2024, 3, 2))
            .category("Meetings")
            .subcategory("Standup")
            .minutes(15.0)
            .build(),
        RecordBuilder::new()
            .on(date(2024, 3, 4))
            .subcategory("Review")
            .minutes(45.0)
            .build(),
        RecordBuilder::new()
            .undated()
            .category("Admin")
            .subcategory("Email")
            .minutes(10.0)
            .build(),
        RecordBuilder::new()
            .on(date(2024, 3, 7))
            .category("Meetings")
            .subcategory("Planning")
            .minutes(60.0)
            .build(),
    ]
    .into_iter()
    .collect()
}

/// Normalizer that hands back a fixed dataset for any `.xlsx` upload
pub struct StubNormalizer {
    dataset: Dataset,
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
        } else {
            Err(TasklensError::UnsupportedFormat(filename.to_string()))
        }
    }
}
