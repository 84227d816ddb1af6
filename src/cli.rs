//! CLI interface for tasklens
//!
//! This module defines the command-line interface using clap. Global flags
//! describe the session to start (which file to load, which dates and
//! category to show); the subcommand decides how the session is driven.
//!
//! # Example
//!
//! ```bash
//! # Summarize the built-in sample data
//! tasklens
//!
//! # Summarize a spreadsheet for the first week of March
//! tasklens --file worklog.xlsx --since 2024-03-01 --until 2024-03-07
//!
//! # Drive a session from stdin
//! tasklens interactive
//!
//! # Re-render whenever the spreadsheet is saved
//! tasklens watch --file worklog.xlsx --interval 2
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tasklens_core::Event;
use tasklens_core::error::{Result, TasklensError};
use tracing::debug;

/// Summarize personal time-tracking spreadsheets
#[derive(Parser, Debug, Clone)]
#[command(name = "tasklens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Spreadsheet to load instead of the sample data (.xls/.xlsx)
    #[arg(long, short = 'f', env = "TASKLENS_FILE", global = true)]
    pub file: Option<PathBuf>,

    /// Filter by start date (YYYY-MM-DD, inclusive)
    #[arg(long, global = true)]
    pub since: Option<String>,

    /// Filter by end date (YYYY-MM-DD, inclusive)
    #[arg(long, global = true)]
    pub until: Option<String>,

    /// Category whose subcategories are broken down
    #[arg(long, short = 'c', global = true)]
    pub category: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the views once (default)
    Show,

    /// Read session commands from stdin, one per line
    Interactive,

    /// Reload the file and reprint the views whenever it changes
    Watch(WatchArgs),
}

/// Arguments for the watch command
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct WatchArgs {
    /// Seconds to wait for writes to settle before reloading
    #[arg(long, default_value = "1")]
    pub interval: u64,
}

impl Cli {
    /// Events that bring a fresh session in line with the flags
    ///
    /// The upload comes first so that the date range and category apply to
    /// the uploaded data.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a date is malformed.
    pub fn startup_events(&self) -> Result<Vec<Event>> {
        let mut events = Vec::new();

        if let Some(path) = &self.file {
            events.push(read_upload(path)?);
        }
        events.extend(self.view_events()?);

        debug!("{} startup events", events.len());
        Ok(events)
    }

    /// Date range and category events, without the upload
    ///
    /// Watch mode does its own uploads and only needs these.
    pub fn view_events(&self) -> Result<Vec<Event>> {
        let mut events = Vec::new();

        if self.since.is_some() || self.until.is_some() {
            events.push(Event::date_range_from_iso(
                self.since.as_deref(),
                self.until.as_deref(),
            )?);
        }
        if let Some(category) = &self.category {
            events.push(Event::select(category.clone()));
        }

        Ok(events)
    }

    /// File to watch, required by the watch command
    pub fn watch_target(&self) -> Result<&Path> {
        self.file.as_deref().ok_or_else(|| {
            TasklensError::InvalidArgument("watch needs --file or TASKLENS_FILE".to_string())
        })
    }
}

/// Read `path` into an upload event named after its file name
///
/// # Errors
///
/// Returns [`TasklensError::Io`] if the file cannot be read.
pub fn read_upload(path: &Path) -> Result<Event> {
    let bytes = std::fs::read(path)?;
    Ok(Event::upload(bytes, upload_name(path)))
}

/// Name an upload is known by: the path's file name
pub fn upload_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
