//! Output formatting module for tasklens
//!
//! This module renders [`Views`] in different formats:
//! - Table format for human-readable terminal output
//! - JSON format for machine-readable output and integration with other tools
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use tasklens::output::get_formatter;
//! use tasklens_core::sample::sample_dataset;
//! use tasklens_core::Session;
//! use tasklens_ingest::SpreadsheetNormalizer;
//!
//! let session = Session::new(Arc::new(sample_dataset()), SpreadsheetNormalizer::new());
//!
//! // Table formatter for the terminal
//! let table = get_formatter(false).format_views(session.views());
//! assert!(table.contains("業務内容の割合"));
//!
//! // JSON formatter for scripts
//! let json = get_formatter(true).format_views(session.views());
//! assert!(json.contains("\"category_breakdown\""));
//! ```

use crate::chart::{Dashboard, PieChart, Slice, Treemap, format_minutes};
use colored::*;
use prettytable::{Cell, Row, Table, format, row};
use serde_json::json;
use tasklens_core::{DateRange, Record, Views};

/// Widest bar drawn next to a chart row
const MAX_BAR_WIDTH: usize = 30;
const BAR_FULL: &str = "█";

/// Trait for output formatters
///
/// Implementations decide how a set of views is presented; the views
/// themselves are already complete.
///
/// # Example Implementation
///
/// ```
/// use tasklens::output::OutputFormatter;
/// use tasklens_core::Views;
///
/// struct SummaryFormatter;
///
/// impl OutputFormatter for SummaryFormatter {
///     fn format_views(&self, views: &Views) -> String {
///         format!("{} rows, {} minutes", views.table_rows.len(), views.total_minutes())
///     }
/// }
/// ```
pub trait OutputFormatter {
    /// Format every view of one transition
    fn format_views(&self, views: &Views) -> String;
}

/// Table formatter for human-readable output
///
/// Each chart becomes a small table with a proportional bar; the filtered
/// records are listed last with a total row.
pub struct TableFormatter {
    /// Whether to use colored output (respects NO_COLOR environment variable)
    colored_output: bool,
    /// Width available for bars
    bar_width: usize,
}

impl TableFormatter {
    pub fn new() -> Self {
        let colored_output = std::env::var("NO_COLOR").is_err();
        let bar_width = terminal_width()
            .map(|w| (w / 3).clamp(10, MAX_BAR_WIDTH))
            .unwrap_or(MAX_BAR_WIDTH);
        Self {
            colored_output,
            bar_width,
        }
    }

    /// Plain formatter with a fixed bar width, for tests and pipes
    pub fn plain(bar_width: usize) -> Self {
        Self {
            colored_output: false,
            bar_width,
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.colored_output {
            text.bold().cyan().to_string()
        } else {
            text.to_string()
        }
    }

    fn bar(&self, percent: f64) -> String {
        let filled = ((percent / 100.0) * self.bar_width as f64).round() as usize;
        let bar = BAR_FULL.repeat(filled.min(self.bar_width));
        if self.colored_output {
            bar.green().to_string()
        } else {
            bar
        }
    }

    fn format_range(range: &DateRange) -> String {
        let bound = |d: Option<chrono::NaiveDate>| {
            d.map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        };
        if range.is_unbounded() {
            "all dates".to_string()
        } else {
            format!("{}..{}", bound(range.start), bound(range.end))
        }
    }

    fn slice_row(&self, slice: &Slice, indent: bool) -> Row {
        let label = if indent {
            format!("  └ {}", slice.label)
        } else {
            slice.label.clone()
        };
        row![
            label,
            r -> format_minutes(slice.minutes),
            r -> format!("{:.1}%", slice.percent),
            self.bar(slice.percent)
        ]
    }

    fn chart_table(&self, chart: &PieChart) -> String {
        let mut output = format!("\n{}\n", self.heading(&chart.title));
        if chart.is_empty() {
            output.push_str("  (no data)\n");
            return output;
        }

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![b -> "Label", b -> "分", b -> "Share", b -> ""]);
        for slice in &chart.slices {
            table.add_row(self.slice_row(slice, false));
        }
        output.push_str(&table.to_string());
        output
    }

    fn treemap_table(&self, map: &Treemap) -> String {
        let mut output = format!("\n{}\n", self.heading(&map.title));
        if map.is_empty() {
            output.push_str("  (no data)\n");
            return output;
        }

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![b -> "Label", b -> "分", b -> "Share", b -> ""]);
        for node in &map.nodes {
            table.add_row(self.slice_row(&node.parent, false));
            for child in &node.children {
                table.add_row(self.slice_row(child, true));
            }
        }
        output.push_str(&table.to_string());
        output
    }

    fn records_table(&self, records: &[Record], total_minutes: f64) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![
            b -> "日付",
            b -> "業務内容",
            b -> "サブカテゴリ",
            b -> "経過時間 (分)",
            b -> "成果"
        ]);

        for record in records {
            table.add_row(row![
                record
                    .date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                record.category,
                record.subcategory,
                r -> format_minutes(record.duration_minutes),
                record.outcome
            ]);
        }

        table.add_row(Row::new(vec![Cell::new(""); 5]));
        table.add_row(row![
            b -> "TOTAL",
            "",
            "",
            rb -> format_minutes(total_minutes),
            ""
        ]);
        table.to_string()
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TableFormatter {
    fn format_views(&self, views: &Views) -> String {
        let mut output = String::new();

        if let Some(message) = &views.error_message {
            let message = if self.colored_output {
                message.red().bold().to_string()
            } else {
                message.clone()
            };
            output.push_str(&format!("{message}\n\n"));
        }

        output.push_str(&format!(
            "Source: {} | Range: {} | Selected: {}\n",
            views.source.label(),
            Self::format_range(&views.date_range),
            views.selected_category.as_deref().unwrap_or("-")
        ));
        output.push_str(&format!(
            "Categories: {}\n",
            if views.available_categories.is_empty() {
                "None".to_string()
            } else {
                views.available_categories.join(", ")
            }
        ));

        let dashboard = Dashboard::from_views(views);
        output.push_str(&self.chart_table(&dashboard.categories));
        if let Some(subcategories) = &dashboard.subcategories {
            output.push_str(&self.chart_table(subcategories));
        }
        output.push_str(&self.treemap_table(&dashboard.hierarchy));

        output.push_str(&format!(
            "\n{}\n",
            self.heading(views.source.label())
        ));
        output.push_str(&self.records_table(&views.table_rows, views.total_minutes()));
        output
    }
}

/// JSON formatter for machine-readable output
///
/// Emits the views as serialized by the core plus the chart descriptions.
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_views(&self, views: &Views) -> String {
        let output = json!({
            "views": views,
            "charts": Dashboard::from_views(views),
            "total_minutes": views.total_minutes(),
        });

        serde_json::to_string_pretty(&output)
            .unwrap_or_else(|e| json!({ "error": e.to_string() }).to_string())
    }
}

/// Get terminal width using the cross-platform terminal_size crate
fn terminal_width() -> Option<usize> {
    terminal_size::terminal_size().map(|(width, _)| width.0 as usize)
}

/// Get appropriate formatter based on JSON flag
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tasklens_core::normalizer::RecordNormalizer;
    use tasklens_core::sample::sample_dataset;
    use tasklens_core::{Dataset, Event, Result, Session, TasklensError};

    struct Rejecting;

    impl RecordNormalizer for Rejecting {
        fn normalize(&self, _raw: &[u8], filename: &str) -> Result<Dataset> {
            Err(TasklensError::UnsupportedFormat(filename.to_string()))
        }
    }

    fn session() -> Session<Rejecting> {
        Session::new(Arc::new(sample_dataset()), Rejecting)
    }

    #[test]
    fn test_table_formatter_sample() {
        let output = TableFormatter::plain(16).format_views(session().views());

        assert!(output.contains("Source: Sample Data | Range: all dates | Selected: Task A"));
        assert!(output.contains("Categories: Task A, Task B, Task C"));
        assert!(output.contains("業務内容の割合"));
        assert!(output.contains("Task Aのサブカテゴリの割合"));
        assert!(output.contains("業務内容とサブカテゴリの階層構造"));
        assert!(output.contains("└ Sub C"));
        assert!(output.contains("2023-01-10"));
        assert!(output.contains("TOTAL"));
        assert!(output.contains("37.5%"));
    }

    #[test]
    fn test_table_formatter_error_and_empty() {
        let mut session = session();
        let views = session
            .apply(Event::upload(b"a,b".to_vec(), "log.csv"))
            .clone();
        let output = TableFormatter::plain(16).format_views(&views);
        assert!(output.starts_with("Unsupported file format: log.csv"));

        let views = session
            .apply(Event::date_range(
                chrono::NaiveDate::from_ymd_opt(2023, 1, 5),
                chrono::NaiveDate::from_ymd_opt(2023, 1, 3),
            ))
            .clone();
        let output = TableFormatter::plain(16).format_views(&views);
        assert!(output.contains("Range: 2023-01-05..2023-01-03"));
        assert!(output.contains("Categories: None"));
        assert!(output.contains("(no data)"));
    }

    #[test]
    fn test_bar_is_proportional() {
        let formatter = TableFormatter::plain(10);
        assert_eq!(formatter.bar(50.0), "█".repeat(5));
        assert_eq!(formatter.bar(0.0), "");
        assert_eq!(formatter.bar(100.0), "█".repeat(10));
    }

    #[test]
    fn test_json_formatter() {
        let output = JsonFormatter.format_views(session().views());
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["views"]["selected_category"], "Task A");
        assert_eq!(value["views"]["source"]["kind"], "sample");
        assert_eq!(value["views"]["table_rows"].as_array().unwrap().len(), 10);
        assert_eq!(value["charts"]["categories"]["title"], "業務内容の割合");
        assert_eq!(value["total_minutes"], 16.0);
        assert!(value["views"].get("error_message").is_none());
    }

    #[test]
    fn test_get_formatter() {
        let views = session().views().clone();
        assert!(get_formatter(true).format_views(&views).starts_with('{'));
        assert!(get_formatter(false).format_views(&views).contains("Task A"));
    }
}
