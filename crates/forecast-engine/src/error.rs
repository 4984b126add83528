//! Forecast Error Types

use thiserror::Error;

/// Errors surfaced to callers of the forecast engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    /// Location is not a column of the feature table
    #[error("Invalid location '{location}'. Available: {available:?}")]
    InvalidLocation {
        location: String,
        available: Vec<String>,
    },

    /// Datetime string could not be parsed
    #[error("Invalid isoformat string: '{0}'")]
    InvalidDatetime(String),

    /// Only one bound of the window was given
    #[error("start_datetime and end_datetime must be given together (missing {0})")]
    IncompleteWindow(&'static str),

    /// Window would produce more records than allowed
    #[error("Requested window of {requested} hours exceeds the limit of {limit} hours")]
    WindowTooLarge { requested: i64, limit: u32 },
}

impl ForecastError {
    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            ForecastError::InvalidLocation { .. } => "invalid_location",
            ForecastError::InvalidDatetime(_) => "invalid_datetime",
            ForecastError::IncompleteWindow(_) => "incomplete_window",
            ForecastError::WindowTooLarge { .. } => "window_too_large",
        }
    }
}
