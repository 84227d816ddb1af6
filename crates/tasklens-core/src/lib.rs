//! Core types, filters, aggregation and view state for tasklens
//!
//! This crate holds everything that decides *what* the dashboard shows:
//! the record model, date-range filtering, first-seen-order aggregation,
//! the built-in sample dataset and the view state controller that keeps
//! every derived view consistent with the current dataset and filters.
//!
//! Spreadsheet decoding lives in `tasklens-ingest`, which plugs into the
//! controller through the [`normalizer::RecordNormalizer`] trait.

pub mod aggregation;
pub mod aggregation_types;
pub mod controller;
pub mod error;
pub mod filters;
pub mod normalizer;
pub mod sample;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use aggregation_types::{AggregateRow, AggregationResult, GroupKey};
pub use controller::{DataSource, Event, Session, Transition, ViewState, Views, reduce};
pub use error::{Result, TasklensError};
pub use filters::{DateRange, filter_by_date};
pub use normalizer::RecordNormalizer;
pub use types::{Dataset, DatasetId, Record, TimeOfDay};
