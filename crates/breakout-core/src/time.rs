//! Lenient parsing for the `--date-min` argument.
//!
//! Accepted forms, tried in order:
//!
//! - RFC 3339 (`2024-03-15T10:00:00Z`, `2024-03-15T10:00:00+02:00`)
//! - naive date-time, assumed UTC (`2024-03-15T10:00:00`, `2024-03-15 10:00:00`)
//! - bare date, midnight UTC (`2024-03-15`)

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use thiserror::Error;

/// Error for an unparseable `--date-min` value.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("could not parse {0:?} as a date or date-time")]
pub struct TimeParseError(pub String);

/// Parses a user-supplied minimum-date string into a UTC instant.
pub fn parse_date_min(input: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    Err(TimeParseError(input.to_string()))
}
