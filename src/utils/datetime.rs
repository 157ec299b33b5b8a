//! Date and time utility functions
//!
//! Timestamps arrive from the backend as RFC3339 strings, sometimes without an
//! offset. Reminder dates are typed by people, usually as `YYYY-MM-DD` or as a
//! browser `datetime-local` value. This module parses all of those and renders
//! them in a short human-readable form ("today", "tomorrow", "in 12 days").

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc, Weekday};

/// Standard date format used throughout the application
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a date string in YYYY-MM-DD format to NaiveDate
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str.trim(), DATE_FORMAT)
}

/// Format a NaiveDate to YYYY-MM-DD string
pub fn format_ymd(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

/// Format current local date to YYYY-MM-DD string
pub fn format_today() -> String {
    format_ymd(Local::now().date_naive())
}

/// Current time as the RFC3339 string the backend stores.
pub fn now_rfc3339() -> String {
    to_rfc3339(Utc::now())
}

pub fn to_rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a timestamp as stored by the backend.
///
/// Accepts RFC3339 with an offset, naive date-times (taken as UTC) and bare
/// dates (midnight UTC). Returns `None` for anything else.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| parse_date(value).ok().map(|date| date.and_time(NaiveTime::MIN)))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parse a reminder date typed by a person.
///
/// Offsets are honoured; values without one are read in the local time zone,
/// which is what a `datetime-local` form field means. A bare date is midnight.
pub fn parse_reminder_input(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| parse_date(value).ok().map(|date| date.and_time(NaiveTime::MIN)))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .or_else(|| Some(Utc.from_utc_datetime(&naive)))
}

/// Format a date relative to `today`
///
/// # Examples
/// * same day -> "today", next day -> "tomorrow"
/// * within a week -> "next Friday" / "last Monday"
/// * within a month -> "in 12 days" / "12 days ago"
/// * otherwise "Jan 15", with the year when it differs from `today`'s
pub fn format_relative_date(date: NaiveDate, today: NaiveDate) -> String {
    let days_diff = (date - today).num_days();

    match days_diff {
        -1 => "yesterday".to_string(),
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        diff if diff > 1 && diff <= 7 => format!("next {}", weekday_name(date.weekday())),
        diff if (-7..-1).contains(&diff) => format!("last {}", weekday_name(date.weekday())),
        diff if diff > 7 && diff <= 30 => format!("in {} days", diff),
        diff if (-30..-7).contains(&diff) => format!("{} days ago", -diff),
        _ => {
            if date.year() == today.year() {
                date.format("%b %d").to_string()
            } else {
                date.format("%b %d, %Y").to_string()
            }
        }
    }
}

/// Format a YYYY-MM-DD string relative to the local date
pub fn format_human_date(date_str: &str) -> String {
    match parse_date(date_str) {
        Ok(date) => format_relative_date(date, Local::now().date_naive()),
        Err(_) => date_str.to_string(),
    }
}

/// Format a backend timestamp in local time, e.g. "tomorrow at 09:30"
pub fn format_human_datetime(datetime_str: &str) -> String {
    match parse_timestamp(datetime_str) {
        Some(dt) => {
            let local = dt.with_timezone(&Local);
            format!(
                "{} at {}",
                format_relative_date(local.date_naive(), Local::now().date_naive()),
                local.format("%H:%M")
            )
        }
        None => datetime_str.to_string(),
    }
}

/// Get a human-readable weekday name
fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
