//! Prediction Records

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Feature type -> value, kept in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureValues(Vec<(String, f64)>);

impl FeatureValues {
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Set a value, replacing an existing entry for the same feature
    pub fn insert(&mut self, feature: impl Into<String>, value: f64) {
        let feature = feature.into();
        match self.0.iter_mut().find(|(name, _)| *name == feature) {
            Some(entry) => entry.1 = value,
            None => self.0.push((feature, value)),
        }
    }

    pub fn get(&self, feature: &str) -> Option<f64> {
        self.0.iter().find(|(name, _)| name == feature).map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, v)| (name.as_str(), *v))
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for FeatureValues {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut values = FeatureValues::default();
        for (feature, value) in iter {
            values.insert(feature, value);
        }
        values
    }
}

impl Serialize for FeatureValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (feature, value) in self.iter() {
            map.serialize_entry(feature, &value)?;
        }
        map.end()
    }
}

/// One hour of a location forecast
#[derive(Debug, Clone, serde::Serialize)]
pub struct PredictionRecord {
    /// Hour being forecast
    pub datetime: String,
    pub location: String,
    pub predictions: FeatureValues,
    /// When this record was generated
    pub timestamp: String,
}

/// Result of expanding a window for one location
#[derive(Debug, Clone, serde::Serialize)]
pub struct WindowForecast {
    pub location: String,
    pub total_predictions: usize,
    pub start_datetime: String,
    pub end_datetime: String,
    pub predictions: Vec<PredictionRecord>,
}

/// Outcome of a feature-key lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStatus {
    /// Exact time match with a numeric value
    MatchFound,
    /// Exact time match but the cell is missing or not numeric
    NoValidValueAtMatch,
    /// No time match, first non-null value of the column used
    PartialMatchUsingFirstRow,
    /// No time match and the column has no usable value
    NoDataFoundUsingDefaults,
    /// Key is not a known column
    NoMatchFoundUsingDefaults,
}

impl LookupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupStatus::MatchFound => "match_found",
            LookupStatus::NoValidValueAtMatch => "no_valid_value_at_match",
            LookupStatus::PartialMatchUsingFirstRow => "partial_match_using_first_row",
            LookupStatus::NoDataFoundUsingDefaults => "no_data_found_using_defaults",
            LookupStatus::NoMatchFoundUsingDefaults => "no_match_found_using_defaults",
        }
    }
}

/// Status-tagged prediction for a single feature key
#[derive(Debug, Clone, serde::Serialize)]
pub struct FeatureKeyPrediction {
    /// Normalized (trimmed, lower-cased) key
    pub feature: String,
    pub hour: u32,
    pub dow: u32,
    pub month: u32,
    pub predictions: FeatureValues,
    pub status: LookupStatus,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_values_keep_order() {
        let values: FeatureValues =
            [("Zone Intrusion", 0.3), ("Camera Fault", 0.1)].into_iter().collect();

        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"{"Zone Intrusion":0.3,"Camera Fault":0.1}"#);
    }

    #[test]
    fn test_feature_values_insert_replaces() {
        let mut values = FeatureValues::default();
        values.insert("Camera Fault", 0.1);
        values.insert("Camera Fault", 0.2);

        assert_eq!(values.iter().count(), 1);
        assert_eq!(values.get("Camera Fault"), Some(0.2));
        assert_eq!(values.get("Zone Intrusion"), None);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&LookupStatus::PartialMatchUsingFirstRow).unwrap();
        assert_eq!(json, format!("\"{}\"", LookupStatus::PartialMatchUsingFirstRow.as_str()));
    }
}
