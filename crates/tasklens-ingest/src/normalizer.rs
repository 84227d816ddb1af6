//! Spreadsheet normalizer
//!
//! Reads the first worksheet of an uploaded workbook with `calamine` and
//! converts each data row into a [`Record`]. The extension of the upload
//! decides whether it is attempted at all; the workbook format itself is
//! detected from the bytes.
//!
//! # Examples
//!
//! ```
//! use tasklens_core::{RecordNormalizer, TasklensError};
//! use tasklens_ingest::SpreadsheetNormalizer;
//!
//! let normalizer = SpreadsheetNormalizer::new();
//! let err = normalizer.normalize(b"date,category", "log.csv").unwrap_err();
//! assert!(matches!(err, TasklensError::UnsupportedFormat(_)));
//! ```

use crate::cells::{date_from_cell, duration_from_cell, text_from_cell};
use crate::columns::ColumnIndex;
use crate::table::RawTable;
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use std::io::Cursor;
use std::path::Path;
use tasklens_core::error::{Result, TasklensError};
use tasklens_core::normalizer::RecordNormalizer;
use tasklens_core::types::{Dataset, Record};
use tracing::{debug, trace};

/// Extension token every accepted upload carries
const SPREADSHEET_TOKEN: &str = "xls";

/// [`RecordNormalizer`] for `.xls`, `.xlsx`, `.xlsm` and `.xlsb` workbooks
#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadsheetNormalizer;

impl SpreadsheetNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Whether `filename` has a spreadsheet extension
    pub fn is_supported(filename: &str) -> bool {
        Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.to_ascii_lowercase().contains(SPREADSHEET_TOKEN))
    }

    /// Open `raw_bytes` as a workbook and read its first worksheet
    ///
    /// # Errors
    ///
    /// Returns [`TasklensError::Workbook`] when the bytes are not a workbook
    /// or the workbook has no worksheets.
    pub fn read_table(&self, raw_bytes: &[u8]) -> Result<RawTable> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(raw_bytes.to_vec()))
            .map_err(|e| TasklensError::Workbook(e.to_string()))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| TasklensError::Workbook("workbook has no worksheets".to_string()))?
            .map_err(|e| TasklensError::Workbook(e.to_string()))?;

        let (height, width) = range.get_size();
        trace!("First worksheet spans {} rows x {} columns", height, width);

        Ok(RawTable::from_range(&range))
    }

    /// Convert a raw table into a dataset, failing on the first bad row
    pub fn normalize_table(&self, table: &RawTable) -> Result<Dataset> {
        let columns = ColumnIndex::resolve(&table.headers)?;

        let mut records = Vec::with_capacity(table.rows.len());
        let mut skipped = 0usize;

        for (row_index, row) in table.rows.iter().enumerate() {
            if RawTable::is_blank_row(row) {
                skipped += 1;
                continue;
            }

            let record = convert_row(&columns, row).map_err(|cause| {
                debug!("Row {} rejected: {}", row_index, cause);
                TasklensError::RowConversion {
                    row: row_index,
                    cause,
                }
            })?;
            records.push(record);
        }

        debug!(
            "Normalized {} records ({} blank rows skipped)",
            records.len(),
            skipped
        );
        Ok(Dataset::new(records))
    }
}

fn convert_row(columns: &ColumnIndex, row: &[Data]) -> std::result::Result<Record, String> {
    let text = |column: usize, name: &str| {
        text_from_cell(RawTable::cell(row, column)).map_err(|e| format!("{name}: {e}"))
    };

    let date = date_from_cell(RawTable::cell(row, columns.date));
    let category = text(columns.category, "category")?;
    let subcategory = text(columns.subcategory, "subcategory")?;
    let duration = duration_from_cell(RawTable::cell(row, columns.duration))
        .map_err(|e| format!("duration: {e}"))?;
    let outcome = text(columns.outcome, "outcome")?;

    if date.is_none() {
        trace!("Row without a readable date: {:?}", RawTable::cell(row, columns.date));
    }

    Ok(Record::from_time_of_day(
        date,
        category,
        subcategory,
        duration,
        outcome,
    ))
}

impl RecordNormalizer for SpreadsheetNormalizer {
    fn normalize(&self, raw_bytes: &[u8], filename: &str) -> Result<Dataset> {
        if !Self::is_supported(filename) {
            return Err(TasklensError::UnsupportedFormat(filename.to_string()));
        }

        debug!("Reading {} ({} bytes)", filename, raw_bytes.len());
        let table = self.read_table(raw_bytes)?;
        self.normalize_table(&table)
    }
}
