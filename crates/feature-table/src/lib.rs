//! Feature Table
//!
//! Read-only, in-memory table of per-location values indexed by
//! (feature_type, hour, dow, month). Loaded once at startup from CSV.

mod loader;
mod table;

pub use table::{Cell, FeatureRow, FeatureTable, TableSummary};

use std::path::PathBuf;
use thiserror::Error;

/// Identifier column holding the feature type of a row
pub const FEATURE_TYPE_COLUMN: &str = "feature_type";
/// Identifier column holding the hour of day (0-23)
pub const HOUR_COLUMN: &str = "hour";
/// Identifier column holding the day of week (0 = Monday)
pub const DOW_COLUMN: &str = "dow";
/// Identifier column holding the month (1-12)
pub const MONTH_COLUMN: &str = "month";

/// Columns that identify a row and are never locations
pub const IDENTIFIER_COLUMNS: [&str; 4] =
    [FEATURE_TYPE_COLUMN, HOUR_COLUMN, DOW_COLUMN, MONTH_COLUMN];

/// Feature types used when the table has no `feature_type` column
pub const DEFAULT_FEATURE_TYPES: [&str; 3] =
    ["Camera Fault", "Helmet Not Detected", "Zone Intrusion"];

/// Feature table errors
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Failed to open feature table {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),
}
