//! Window Expansion
//!
//! Enumerates hourly timestamps from start to end, both inclusive, and looks
//! up every known feature type at each hour.

use crate::clock::Clock;
use crate::error::ForecastError;
use crate::lookup::lookup_location;
use crate::record::{FeatureValues, PredictionRecord, WindowForecast};
use crate::time::{format_datetime, format_generated, parse_datetime, TimeKey};
use chrono::{Duration, NaiveDateTime};
use feature_table::FeatureTable;
use tracing::debug;

/// Hours between now and the start of the default window
const DEFAULT_LEAD_HOURS: i64 = 1;
/// Hours between start and end of the default window
const DEFAULT_SPAN_HOURS: i64 = 3;

/// Treat empty strings as absent
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// Resolve the (start, end) bounds of a request
fn resolve_bounds(
    now: NaiveDateTime,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<(NaiveDateTime, NaiveDateTime), ForecastError> {
    match (non_empty(start), non_empty(end)) {
        (None, None) => {
            let start = now + Duration::hours(DEFAULT_LEAD_HOURS);
            Ok((start, start + Duration::hours(DEFAULT_SPAN_HOURS)))
        }
        (Some(start), Some(end)) => Ok((parse_datetime(start)?, parse_datetime(end)?)),
        (Some(_), None) => Err(ForecastError::IncompleteWindow("end_datetime")),
        (None, Some(_)) => Err(ForecastError::IncompleteWindow("start_datetime")),
    }
}

/// Number of hourly points from start to end inclusive
fn point_count(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    if start > end {
        0
    } else {
        (end - start).num_hours() + 1
    }
}

/// Forecast every hour of a window for one location.
///
/// With neither bound given the window is now+1h through now+4h.
pub fn expand_window(
    table: &FeatureTable,
    clock: &dyn Clock,
    max_window_hours: u32,
    location: &str,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<WindowForecast, ForecastError> {
    if !table.is_valid_location(location) {
        return Err(ForecastError::InvalidLocation {
            location: location.to_string(),
            available: table.locations().to_vec(),
        });
    }

    let (start, end) = resolve_bounds(clock.now(), start, end)?;

    let requested = point_count(start, end);
    if requested > i64::from(max_window_hours) {
        return Err(ForecastError::WindowTooLarge {
            requested,
            limit: max_window_hours,
        });
    }
    debug!(location, %start, %end, points = requested, "Expanding window");

    let mut predictions = Vec::with_capacity(requested as usize);
    let mut current = start;
    while current <= end {
        let key = TimeKey::from_datetime(&current);

        let mut values = FeatureValues::with_capacity(table.feature_types().len());
        for feature in table.feature_types() {
            let value = lookup_location(table, feature, key.hour, key.dow, key.month, location);
            values.insert(feature.as_str(), value);
        }

        predictions.push(PredictionRecord {
            datetime: format_datetime(&current),
            location: location.to_string(),
            predictions: values,
            timestamp: format_generated(&clock.now()),
        });

        current = match current.checked_add_signed(Duration::hours(1)) {
            Some(next) => next,
            None => break,
        };
    }

    Ok(WindowForecast {
        location: location.to_string(),
        total_predictions: predictions.len(),
        start_datetime: format_datetime(&start),
        end_datetime: format_datetime(&end),
        predictions,
    })
}
