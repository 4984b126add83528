//! Feature-Key Lookup
//!
//! Alternate lookup where the key names a location column rather than a
//! feature type. The single value found is broadcast to every category in
//! [`KEYED_CATEGORIES`] and the path taken is reported as a [`LookupStatus`].

use crate::record::{FeatureKeyPrediction, FeatureValues, LookupStatus};
use crate::time::TimeKey;
use feature_table::{Cell, FeatureTable};
use serde::Deserialize;
use tracing::debug;

/// Categories filled by a feature-key lookup
pub const KEYED_CATEGORIES: [&str; 3] = ["Camera Fault", "Helmet Not Detected", "Zone Intrusion"];

/// Value used for every category when the table has nothing usable
pub const DEFAULT_FEATURE_VALUE: f64 = 0.01;

/// Input for a feature-key lookup. Missing fields default to
/// `"default"` and zeros.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureKeyQuery {
    #[serde(default = "default_feature")]
    pub feature: String,
    #[serde(default)]
    pub hour: u32,
    #[serde(default)]
    pub dow: u32,
    #[serde(default)]
    pub month: u32,
}

fn default_feature() -> String {
    "default".to_string()
}

impl Default for FeatureKeyQuery {
    fn default() -> Self {
        Self {
            feature: default_feature(),
            hour: 0,
            dow: 0,
            month: 0,
        }
    }
}

impl FeatureKeyQuery {
    pub fn new(feature: impl Into<String>, hour: u32, dow: u32, month: u32) -> Self {
        Self {
            feature: feature.into(),
            hour,
            dow,
            month,
        }
    }

    pub fn time_key(&self) -> TimeKey {
        TimeKey::new(self.hour, self.dow, self.month)
    }
}

fn broadcast(value: f64) -> FeatureValues {
    KEYED_CATEGORIES.iter().map(|c| (*c, value)).collect()
}

/// Resolve the value and status for a key without building the record
fn resolve(table: &FeatureTable, normalized: &str, key: TimeKey) -> (f64, LookupStatus) {
    // The index is case-insensitive, but the column itself must carry the
    // normalized name. Case variants of it may sit alongside.
    let exact = table
        .normalized_matches(normalized)
        .find(|(_, name)| *name == normalized);
    let Some((position, _)) = exact else {
        debug!(feature = normalized, "Invalid feature");
        return (DEFAULT_FEATURE_VALUE, LookupStatus::NoMatchFoundUsingDefaults);
    };

    let matched = table.first_time_match(key.hour, key.dow, key.month);

    if let Some(row) = matched {
        return match row.value(position) {
            Cell::Number(v) => (*v, LookupStatus::MatchFound),
            other => {
                debug!(feature = normalized, value = ?other, "No valid value at match");
                (DEFAULT_FEATURE_VALUE, LookupStatus::NoValidValueAtMatch)
            }
        };
    }

    debug!(
        hour = key.hour,
        dow = key.dow,
        month = key.month,
        "No exact match, using first non-null value"
    );
    let first = table
        .rows()
        .iter()
        .map(|row| row.value(position))
        .find(|cell| !cell.is_missing());

    match first {
        Some(Cell::Number(v)) => (*v, LookupStatus::PartialMatchUsingFirstRow),
        _ => {
            debug!(feature = normalized, "No valid data in column");
            (DEFAULT_FEATURE_VALUE, LookupStatus::NoDataFoundUsingDefaults)
        }
    }
}

/// Status-tagged lookup by feature key.
///
/// `generated_at` is stamped on the record as its generation time.
pub fn lookup_feature_key(
    table: &FeatureTable,
    query: &FeatureKeyQuery,
    generated_at: String,
) -> FeatureKeyPrediction {
    let normalized = query.feature.trim().to_lowercase();
    let (value, status) = resolve(table, &normalized, query.time_key());
    debug!(feature = %normalized, status = status.as_str(), value, "Feature-key lookup");

    FeatureKeyPrediction {
        feature: normalized,
        hour: query.hour,
        dow: query.dow,
        month: query.month,
        predictions: broadcast(value),
        status,
        timestamp: generated_at,
    }
}
