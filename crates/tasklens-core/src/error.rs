//! Error types for tasklens
//!
//! This module defines the error type shared by every tasklens crate.
//! Ingestion failures (unsupported file, missing column, bad row) abort an
//! upload as a whole; filtering and aggregation never produce errors.
//!
//! # Example
//!
//! ```
//! use tasklens_core::error::{Result, TasklensError};
//!
//! fn check_extension(filename: &str) -> Result<()> {
//!     if filename.ends_with(".csv") {
//!         return Err(TasklensError::UnsupportedFormat(filename.to_string()));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_extension("log.csv").is_err());
//! ```

use thiserror::Error;

/// Main error type for tasklens operations
#[derive(Error, Debug)]
pub enum TasklensError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The uploaded file is not a spreadsheet
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// A required column is absent from the header row
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A data row could not be converted into a record
    #[error("Error processing file: row {row}: {cause}")]
    RowConversion {
        /// Zero-based data row index (header excluded)
        row: usize,
        /// What went wrong with the row
        cause: String,
    },

    /// The bytes could not be opened as a workbook
    #[error("Error processing file: {0}")]
    Workbook(String),

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// File watching failed
    #[error("File watch error: {0}")]
    Watch(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl TasklensError {
    /// Whether this error came out of ingesting an upload
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            TasklensError::UnsupportedFormat(_)
                | TasklensError::MissingColumn(_)
                | TasklensError::RowConversion { .. }
                | TasklensError::Workbook(_)
        )
    }
}

/// Convenience type alias for Results in tasklens
pub type Result<T> = std::result::Result<T, TasklensError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = TasklensError::MissingColumn("経過時間".to_string());
        assert_eq!(error.to_string(), "Missing required column: 経過時間");

        let error = TasklensError::RowConversion {
            row: 3,
            cause: "duration is not a time of day".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Error processing file: row 3: duration is not a time of day"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: TasklensError = io_error.into();
        assert!(matches!(error, TasklensError::Io(_)));
        assert!(!error.is_parse_error());
    }

    #[test]
    fn test_parse_error_kinds() {
        assert!(TasklensError::UnsupportedFormat("a.csv".into()).is_parse_error());
        assert!(TasklensError::Workbook("bad zip".into()).is_parse_error());
        assert!(!TasklensError::InvalidDate("2023-13-01".into()).is_parse_error());
    }
}
