//! Cell conversion helpers
//!
//! Spreadsheet cells arrive as loosely typed [`calamine::Data`]. These
//! functions coerce them into the record fields:
//!
//! - dates are lenient: anything that is not recognisably a date becomes
//!   `None` instead of failing the row
//! - durations are strict: the cell must hold a time of day, otherwise the
//!   row is rejected
//! - text fields accept strings, numbers and booleans, but not error cells

use calamine::Data;
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use tasklens_core::types::TimeOfDay;

const SECONDS_PER_DAY: u32 = 86_400;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];

const DAY_UNITS: [(char, f64); 1] = [('D', 86_400.0)];
const TIME_UNITS: [(char, f64); 3] = [('H', 3600.0), ('M', 60.0), ('S', 1.0)];

/// Read a date cell; unreadable values become `None`
pub fn date_from_cell(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(dt) if !dt.is_duration() => dt.as_datetime().map(|d| d.date()),
        Data::DateTimeIso(text) | Data::String(text) => parse_date_text(text),
        Data::Float(value) => date_from_serial(*value),
        Data::Int(value) => date_from_serial(*value as f64),
        _ => None,
    }
}

/// Read a duration cell as a time of day
///
/// The error is a short description used as the row failure cause.
pub fn duration_from_cell(cell: &Data) -> Result<TimeOfDay, String> {
    match cell {
        Data::DateTime(dt) => {
            let days = dt.as_f64();
            if dt.is_duration() && !(0.0..1.0).contains(&days) {
                return Err(format!("duration of {days} days is not a time of day"));
            }
            time_of_day_from_fraction(days)
                .ok_or_else(|| format!("{days} is not a time of day"))
        }
        Data::DateTimeIso(text) => NaiveDateTime::parse_from_str(text, DATETIME_FORMATS[0])
            .map(|dt| dt.time())
            .or_else(|_| NaiveTime::parse_from_str(text, TIME_FORMATS[0]))
            .map(TimeOfDay::from)
            .map_err(|_| format!("'{text}' is not a time of day")),
        Data::DurationIso(text) => parse_iso_duration(text),
        Data::String(text) => {
            parse_time_text(text).ok_or_else(|| format!("'{}' is not a time of day", text.trim()))
        }
        Data::Float(value) => Err(format!("{value} is a plain number, not a time of day")),
        Data::Int(value) => Err(format!("{value} is a plain number, not a time of day")),
        Data::Bool(value) => Err(format!("{value} is not a time of day")),
        Data::Error(e) => Err(format!("cell error {e}")),
        Data::Empty => Err("duration is empty".to_string()),
    }
}

/// Read a text cell, trimming strings and rendering numbers
pub fn text_from_cell(cell: &Data) -> Result<String, String> {
    match cell {
        Data::String(text) => Ok(text.trim().to_string()),
        Data::Float(value) => Ok(number_text(*value)),
        Data::Int(value) => Ok(value.to_string()),
        Data::Bool(value) => Ok(value.to_string()),
        Data::DateTime(dt) => Ok(dt
            .as_datetime()
            .map(|d| d.to_string())
            .unwrap_or_else(|| number_text(dt.as_f64()))),
        Data::DateTimeIso(text) | Data::DurationIso(text) => Ok(text.clone()),
        Data::Error(e) => Err(format!("cell error {e}")),
        Data::Empty => Ok(String::new()),
    }
}

fn number_text(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Time of day held by the fractional part of a spreadsheet day number
///
/// Rounded to the nearest second and capped at 23:59:59; seconds are then
/// dropped by [`TimeOfDay`].
pub fn time_of_day_from_fraction(days: f64) -> Option<TimeOfDay> {
    if !days.is_finite() {
        return None;
    }
    let seconds = (days.rem_euclid(1.0) * f64::from(SECONDS_PER_DAY)).round() as u32;
    let seconds = seconds.min(SECONDS_PER_DAY - 1);
    TimeOfDay::new(seconds / 3600, seconds % 3600 / 60)
}

/// Date of a serial day number in the 1900 date system
///
/// Serial 60 is the fictitious 1900-02-29 and has no date.
pub fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let days = serial.floor() as u64;
    let epoch = match days {
        60 => return None,
        d if d < 60 => NaiveDate::from_ymd_opt(1899, 12, 31)?,
        _ => NaiveDate::from_ymd_opt(1899, 12, 30)?,
    };
    epoch.checked_add_days(Days::new(days))
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Parse `H:MM` or `H:MM:SS` text
pub fn parse_time_text(text: &str) -> Option<TimeOfDay> {
    let text = text.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(text, fmt).ok())
        .map(TimeOfDay::from)
}

/// Parse an ISO 8601 duration such as `PT1H30M0S`, which must be under a day
pub fn parse_iso_duration(text: &str) -> Result<TimeOfDay, String> {
    let invalid = || format!("'{text}' is not a valid duration");
    let body = text.trim().strip_prefix('P').ok_or_else(invalid)?;

    let (day_part, time_part) = match body.split_once('T') {
        Some((days, time)) => (days, time),
        None => (body, ""),
    };

    let mut seconds = 0.0;
    for (part, units) in [(day_part, &DAY_UNITS[..]), (time_part, &TIME_UNITS[..])] {
        let mut number = String::new();
        for c in part.chars() {
            if c.is_ascii_digit() || c == '.' {
                number.push(c);
                continue;
            }
            let scale = units
                .iter()
                .find(|(unit, _)| *unit == c)
                .map(|(_, scale)| *scale)
                .ok_or_else(invalid)?;
            let value: f64 = number.parse().map_err(|_| invalid())?;
            seconds += value * scale;
            number.clear();
        }
        if !number.is_empty() {
            return Err(invalid());
        }
    }

    if seconds >= f64::from(SECONDS_PER_DAY) {
        return Err(format!("duration '{text}' is not a time of day"));
    }
    time_of_day_from_fraction(seconds / f64::from(SECONDS_PER_DAY)).ok_or_else(invalid)
}
