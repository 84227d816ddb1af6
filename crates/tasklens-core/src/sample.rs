//! Built-in sample dataset
//!
//! Shown until the user uploads a spreadsheet of their own. Durations are
//! already in minutes.

use crate::types::{Dataset, Record};
use chrono::{Days, NaiveDate};

const SAMPLE_ROWS: [(&str, &str, f64, &str); 10] = [
    ("Task A", "Sub A", 1.5, "Result A"),
    ("Task B", "Sub A", 2.0, "Result B"),
    ("Task C", "Sub A", 3.0, "Result C"),
    ("Task A", "Sub C", 1.5, "Result A"),
    ("Task B", "Sub B", 1.0, "Result B"),
    ("Task C", "Sub B", 1.5, "Result C"),
    ("Task A", "Sub A", 1.5, "Result A"),
    ("Task B", "Sub C", 1.0, "Result B"),
    ("Task C", "Sub B", 1.5, "Result C"),
    ("Task A", "Sub A", 1.5, "Result A"),
];

/// Category selected when a session starts on the sample data
pub const SAMPLE_INITIAL_CATEGORY: &str = "Task A";

/// Ten daily entries starting 2023-01-01
pub fn sample_dataset() -> Dataset {
    let first_day = NaiveDate::from_ymd_opt(2023, 1, 1);

    SAMPLE_ROWS
        .iter()
        .enumerate()
        .map(|(i, &(category, subcategory, minutes, outcome))| {
            let date = first_day.and_then(|d| d.checked_add_days(Days::new(i as u64)));
            Record::new(date, category, subcategory, minutes, outcome)
        })
        .collect()
}
