//! Datetime Parsing and Formatting
//!
//! All datetimes are naive local times. An explicit UTC offset is accepted
//! on input and dropped.

use crate::error::ForecastError;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Output format for window timestamps
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Output format for generation timestamps (microsecond precision)
const GENERATED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Accepted naive input layouts. `%.f` also matches no fraction.
const INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Lookup key derived from a timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeKey {
    /// Hour of day, 0-23
    pub hour: u32,
    /// Day of week, 0 = Monday
    pub dow: u32,
    /// Month, 1-12
    pub month: u32,
}

impl TimeKey {
    pub fn new(hour: u32, dow: u32, month: u32) -> Self {
        Self { hour, dow, month }
    }

    pub fn from_datetime(dt: &NaiveDateTime) -> Self {
        Self {
            hour: dt.hour(),
            dow: dt.weekday().num_days_from_monday(),
            month: dt.month(),
        }
    }
}

/// Parse an ISO 8601 style datetime
pub fn parse_datetime(raw: &str) -> Result<NaiveDateTime, ForecastError> {
    let s = raw.trim();
    let invalid = || ForecastError::InvalidDatetime(raw.to_string());

    for format in INPUT_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).ok_or_else(invalid);
    }

    // YYYY-MM-DDTHH
    if s.len() == 13 && matches!(s.as_bytes()[10], b'T' | b' ') {
        if let (Some(date), Some(hour)) = (s.get(..10), s.get(11..)) {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d");
            if let (Ok(date), Ok(hour)) = (date, hour.parse::<u32>()) {
                return date.and_hms_opt(hour, 0, 0).ok_or_else(invalid);
            }
        }
    }

    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.naive_local())
        .map_err(|_| invalid())
}

/// Render a window timestamp, seconds precision
pub fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// Render a generation timestamp, microsecond precision
pub fn format_generated(dt: &NaiveDateTime) -> String {
    dt.format(GENERATED_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, s).unwrap()
    }

    #[test]
    fn test_parse_formats() {
        let expected = dt(2025, 10, 23, 20, 0, 0);
        assert_eq!(parse_datetime("2025-10-23T20:00:00").unwrap(), expected);
        assert_eq!(parse_datetime("2025-10-23 20:00:00").unwrap(), expected);
        assert_eq!(parse_datetime("2025-10-23T20:00").unwrap(), expected);
        assert_eq!(parse_datetime("2025-10-23T20").unwrap(), expected);
        assert_eq!(parse_datetime("2025-10-23T20:00:00+05:30").unwrap(), expected);
        assert_eq!(parse_datetime("2025-10-23").unwrap(), dt(2025, 10, 23, 0, 0, 0));

        let fractional = parse_datetime("2025-10-23T20:00:00.250").unwrap();
        assert_eq!(fractional.nanosecond(), 250_000_000);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for raw in ["", "tomorrow", "2025-13-01T00:00:00", "2025-10-23T25", "23/10/2025"] {
            assert_eq!(
                parse_datetime(raw),
                Err(ForecastError::InvalidDatetime(raw.to_string())),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_time_key_monday_is_zero() {
        // 2025-10-20 is a Monday
        let key = TimeKey::from_datetime(&dt(2025, 10, 20, 7, 30, 0));
        assert_eq!(key, TimeKey::new(7, 0, 10));

        let sunday = TimeKey::from_datetime(&dt(2025, 10, 26, 23, 0, 0));
        assert_eq!(sunday.dow, 6);
    }

    #[test]
    fn test_formatting() {
        let value = dt(2025, 10, 23, 20, 0, 0);
        assert_eq!(format_datetime(&value), "2025-10-23T20:00:00");
        assert_eq!(format_generated(&value), "2025-10-23T20:00:00.000000");
    }
}
