//! Line-oriented session driver
//!
//! Each input line is one command. Commands that change the session turn
//! into exactly one [`Event`], are applied to completion and the refreshed
//! views are printed before the next line is read.
//!
//! ```text
//! upload <path>          load a spreadsheet
//! range [start] [end]    set the date range; "-" leaves a bound open
//! select <category>      choose the category for the subcategory chart
//! show                   print the current views
//! help                   list commands
//! quit                   leave the session
//! ```

use crate::cli::read_upload;
use crate::output::OutputFormatter;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tasklens_core::error::{Result, TasklensError};
use tasklens_core::{Event, RecordNormalizer, Session};
use tracing::debug;

pub const HELP: &str = "\
Commands:
  upload <path>          load a spreadsheet (.xls/.xlsx)
  range [start] [end]    set the date range (YYYY-MM-DD, \"-\" for an open bound)
  select <category>      choose the category for the subcategory chart
  show                   print the current views
  help                   show this help
  quit                   leave the session";

const OPEN_BOUND: &str = "-";

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Upload(PathBuf),
    Range {
        start: Option<String>,
        end: Option<String>,
    },
    Select(String),
    Show,
    Help,
    Quit,
}

impl SessionCommand {
    /// Parse a line; blank lines and `#` comments give `None`
    ///
    /// # Errors
    ///
    /// Returns [`TasklensError::InvalidArgument`] for unknown commands or
    /// missing arguments.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "upload" | "open" => {
                if rest.is_empty() {
                    return Err(TasklensError::InvalidArgument(
                        "upload needs a file path".to_string(),
                    ));
                }
                SessionCommand::Upload(PathBuf::from(rest))
            }
            "range" => {
                let mut bounds = rest.split_whitespace();
                let bound = |b: Option<&str>| b.filter(|b| *b != OPEN_BOUND).map(str::to_string);
                let start = bound(bounds.next());
                let end = bound(bounds.next());
                if bounds.next().is_some() {
                    return Err(TasklensError::InvalidArgument(
                        "range takes at most two dates".to_string(),
                    ));
                }
                SessionCommand::Range { start, end }
            }
            "select" => {
                if rest.is_empty() {
                    return Err(TasklensError::InvalidArgument(
                        "select needs a category".to_string(),
                    ));
                }
                SessionCommand::Select(rest.to_string())
            }
            "show" => SessionCommand::Show,
            "help" | "?" => SessionCommand::Help,
            "quit" | "exit" => SessionCommand::Quit,
            other => {
                return Err(TasklensError::InvalidArgument(format!(
                    "unknown command '{other}', try 'help'"
                )));
            }
        };

        Ok(Some(command))
    }

    /// The session event this command stands for, if any
    pub fn to_event(&self) -> Result<Option<Event>> {
        match self {
            SessionCommand::Upload(path) => read_upload(path).map(Some),
            SessionCommand::Range { start, end } => {
                Event::date_range_from_iso(start.as_deref(), end.as_deref()).map(Some)
            }
            SessionCommand::Select(category) => Ok(Some(Event::select(category.clone()))),
            SessionCommand::Show | SessionCommand::Help | SessionCommand::Quit => Ok(None),
        }
    }
}

/// Drive `session` from `input` until `quit` or end of input
///
/// Bad commands are reported on `output` and the loop carries on; only
/// write failures end it early.
pub fn run_interactive<N, R, W>(
    session: &mut Session<N>,
    formatter: &dyn OutputFormatter,
    input: R,
    output: &mut W,
    prompt: bool,
) -> Result<()>
where
    N: RecordNormalizer,
    R: BufRead,
    W: Write,
{
    writeln!(output, "{}", formatter.format_views(session.views()))?;

    let mut lines = input.lines();
    loop {
        if prompt {
            write!(output, "> ")?;
            output.flush()?;
        }

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        let command = match SessionCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                writeln!(output, "Error: {e}")?;
                continue;
            }
        };
        debug!("Interactive command: {:?}", command);

        match command {
            SessionCommand::Quit => break,
            SessionCommand::Help => writeln!(output, "{HELP}")?,
            SessionCommand::Show => {
                writeln!(output, "{}", formatter.format_views(session.views()))?
            }
            other => match other.to_event() {
                Ok(Some(event)) => {
                    let views = session.apply(event);
                    writeln!(output, "{}", formatter.format_views(views))?;
                }
                Ok(None) => {}
                Err(e) => writeln!(output, "Error: {e}")?,
            },
        }
    }

    Ok(())
}
