//! Header row plus raw data rows of the first worksheet

use crate::cells::text_from_cell;
use calamine::{Data, Range};

/// A worksheet split into header names and untyped data rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Data>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Data>>) -> Self {
        Self { headers, rows }
    }

    /// Split a worksheet range; its first row becomes the header row
    pub fn from_range(range: &Range<Data>) -> Self {
        let mut rows = range.rows();
        let headers = rows
            .next()
            .map(|header| {
                header
                    .iter()
                    .map(|cell| text_from_cell(cell).unwrap_or_default())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            headers,
            rows: rows.map(<[Data]>::to_vec).collect(),
        }
    }

    /// Cell of `row` at `column`, empty when the row is short
    pub fn cell(row: &[Data], column: usize) -> &Data {
        row.get(column).unwrap_or(&Data::Empty)
    }

    /// Whether every cell of `row` is empty or blank text
    pub fn is_blank_row(row: &[Data]) -> bool {
        row.iter().all(|cell| match cell {
            Data::Empty => true,
            Data::String(text) => text.trim().is_empty(),
            _ => false,
        })
    }
}
