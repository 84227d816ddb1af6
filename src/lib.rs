//! tasklens - Summarize personal time-tracking spreadsheets
//!
//! This library provides functionality to:
//! - Load `.xls`/`.xlsx` time logs (or fall back to built-in sample data)
//! - Restrict them to a date range and pick a category to drill into
//! - Describe the category, subcategory and hierarchy charts
//! - Render everything as terminal tables or JSON
//! - Drive a session interactively or by watching the spreadsheet
//!
//! The data model, filtering, aggregation and view state live in
//! `tasklens-core`; spreadsheet decoding lives in `tasklens-ingest`.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use tasklens::chart::Dashboard;
//! use tasklens_core::sample::sample_dataset;
//! use tasklens_core::{Event, Session};
//! use tasklens_ingest::SpreadsheetNormalizer;
//!
//! let mut session = Session::new(Arc::new(sample_dataset()), SpreadsheetNormalizer::new());
//! let views = session.apply(Event::select("Task B"));
//!
//! let dashboard = Dashboard::from_views(views);
//! assert_eq!(dashboard.categories.slices.len(), 3);
//! assert_eq!(
//!     dashboard.subcategories.map(|chart| chart.title),
//!     Some("Task Bのサブカテゴリの割合".to_string())
//! );
//! ```

pub mod chart;
pub mod cli;
pub mod interactive;
pub mod output;
pub mod watch;

// Re-export commonly used types
pub use tasklens_core::{
    AggregationResult, Dataset, DateRange, Event, GroupKey, Record, RecordNormalizer, Result,
    Session, TasklensError, Views,
};
pub use tasklens_ingest::SpreadsheetNormalizer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
