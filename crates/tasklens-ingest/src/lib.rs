//! Spreadsheet ingestion for tasklens
//!
//! This crate implements [`tasklens_core::RecordNormalizer`] on top of
//! `calamine`, turning uploaded `.xls`/`.xlsx` workbooks into a typed
//! [`tasklens_core::Dataset`]. Reading is all-or-nothing: the first row that
//! cannot be converted aborts the whole upload.

pub mod cells;
pub mod columns;
pub mod normalizer;
pub mod table;

pub use columns::ColumnIndex;
pub use normalizer::SpreadsheetNormalizer;
pub use table::RawTable;
