//! Header names of an uploaded time log
//!
//! The sheet must carry these five headers somewhere in its first row.
//! Surrounding whitespace in a header is ignored; extra columns are fine.

use tasklens_core::error::{Result, TasklensError};

pub const DATE_COLUMN: &str = "日付";
pub const CATEGORY_COLUMN: &str = "業務内容";
pub const SUBCATEGORY_COLUMN: &str = "サブカテゴリ";
pub const DURATION_COLUMN: &str = "経過時間";
pub const OUTCOME_COLUMN: &str = "成果";

/// Required headers, in the order they are checked
pub const REQUIRED_COLUMNS: [&str; 5] = [
    DATE_COLUMN,
    CATEGORY_COLUMN,
    SUBCATEGORY_COLUMN,
    DURATION_COLUMN,
    OUTCOME_COLUMN,
];

/// Positions of the required columns within a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub date: usize,
    pub category: usize,
    pub subcategory: usize,
    pub duration: usize,
    pub outcome: usize,
}

impl ColumnIndex {
    /// Locate every required column in `headers`
    ///
    /// # Errors
    ///
    /// Returns [`TasklensError::MissingColumn`] naming the first required
    /// header that is absent.
    pub fn resolve(headers: &[String]) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| TasklensError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            date: find(DATE_COLUMN)?,
            category: find(CATEGORY_COLUMN)?,
            subcategory: find(SUBCATEGORY_COLUMN)?,
            duration: find(DURATION_COLUMN)?,
            outcome: find(OUTCOME_COLUMN)?,
        })
    }
}
