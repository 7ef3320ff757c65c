use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DateFormatError {
    #[error("Invalid date format: '{0}'")]
    InvalidDateFormat(String),
    #[error("Invalid clock time: '{0}'")]
    InvalidClockTime(String),
}

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(value: &str) -> Result<NaiveDate, DateFormatError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| DateFormatError::InvalidDateFormat(value.to_string()))
}

/// Accepts RFC 3339 timestamps as well as offset-less `YYYY-MM-DDTHH:MM[:SS]`.
/// Offsets are dropped: the wall-clock part is kept as a naive local time.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, DateFormatError> {
    let trimmed = value.trim();

    if let Ok(stamped) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(stamped.naive_local());
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| DateFormatError::InvalidDateFormat(value.to_string()))
}

pub fn parse_clock_time(value: &str) -> Result<NaiveTime, DateFormatError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| DateFormatError::InvalidClockTime(value.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
