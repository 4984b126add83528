//! Location Lookup
//!
//! Exact (feature_type, hour, dow, month) match, falling back to the mean of
//! the location column over the feature's rows, then to 0.0.

use feature_table::FeatureTable;
use tracing::trace;

/// Round to 6 decimal places.
///
/// Goes through decimal formatting so the stored binary value is rounded
/// exactly: 0.1234565 is just below the tie and becomes 0.123456.
pub fn round6(value: f64) -> f64 {
    format!("{:.6}", value).parse().unwrap_or(value)
}

/// Value for one feature type at one location and hour.
///
/// Never fails: an unknown location or a feature without data yields 0.0.
/// A non-numeric exact-match cell is treated like a missing match.
pub fn lookup_location(
    table: &FeatureTable,
    feature_type: &str,
    hour: u32,
    dow: u32,
    month: u32,
    location: &str,
) -> f64 {
    let Some(position) = table.location_position(location) else {
        return 0.0;
    };

    let exact = table.first_match(feature_type, hour, dow, month);

    if let Some(value) = exact.and_then(|row| row.value(position).as_number()) {
        return round6(value);
    }

    let (sum, count) = table
        .feature_rows(feature_type)
        .filter_map(|row| row.value(position).as_number())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        trace!(feature_type, location, "No data for feature, using 0.0");
        return 0.0;
    }

    let mean = sum / count as f64;
    trace!(feature_type, location, hour, dow, month, mean, "No exact match, using mean");
    round6(mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TABLE: &str = "\
feature_type,hour,dow,month,Finishing Stand,Gate A
Camera Fault,20,3,10,0.1234567,0.5
Camera Fault,21,3,10,0.3,
Camera Fault,20,3,10,0.9,0.9
Helmet Not Detected,20,3,10,,
Zone Intrusion,20,3,10,text,0.2
Zone Intrusion,8,0,1,0.6,0.4
";

    fn table() -> FeatureTable {
        FeatureTable::from_reader(TABLE.as_bytes()).unwrap()
    }

    #[test]
    fn test_exact_match_first_row_wins() {
        let table = table();
        let value = lookup_location(&table, "Camera Fault", 20, 3, 10, "Finishing Stand");
        assert_eq!(value, 0.123457);
    }

    #[test]
    fn test_mean_fallback() {
        let table = table();
        // No row for hour 5: mean of 0.1234567, 0.3, 0.9
        let value = lookup_location(&table, "Camera Fault", 5, 3, 10, "Finishing Stand");
        assert_eq!(value, round6((0.1234567 + 0.3 + 0.9) / 3.0));
    }

    #[test]
    fn test_mean_ignores_missing_cells() {
        let table = table();
        let value = lookup_location(&table, "Camera Fault", 5, 3, 10, "Gate A");
        assert_eq!(value, 0.7);
    }

    #[test]
    fn test_all_null_is_zero() {
        let table = table();
        assert_eq!(
            lookup_location(&table, "Helmet Not Detected", 20, 3, 10, "Gate A"),
            0.0
        );
        assert_eq!(
            lookup_location(&table, "Unknown Feature", 20, 3, 10, "Gate A"),
            0.0
        );
    }

    #[test]
    fn test_non_numeric_match_uses_mean() {
        let table = table();
        let value = lookup_location(&table, "Zone Intrusion", 20, 3, 10, "Finishing Stand");
        assert_eq!(value, 0.6);
    }

    #[test]
    fn test_unknown_location_is_zero() {
        let table = table();
        assert_eq!(lookup_location(&table, "Camera Fault", 20, 3, 10, "hour"), 0.0);
        assert_eq!(lookup_location(&table, "Camera Fault", 20, 3, 10, "Nowhere"), 0.0);
    }

    #[test]
    fn test_round6() {
        assert_eq!(round6(0.1234564), 0.123456);
        assert_eq!(round6(0.1234566), 0.123457);
        assert_eq!(round6(2.0), 2.0);
        assert_eq!(round6(-0.25), -0.25);
    }

    #[test]
    fn test_round6_near_ties_follow_binary_value() {
        assert_eq!(round6(0.1234565), 0.123456);
        assert_eq!(round6(0.0000005), 0.0);
        assert_eq!(round6(0.0000015), 0.000002);
    }

    #[test]
    fn test_exact_match_rounds_stored_tie() {
        let csv = "feature_type,hour,dow,month,Site\nCamera Fault,1,0,1,0.1234565\n";
        let table = FeatureTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(lookup_location(&table, "Camera Fault", 1, 0, 1, "Site"), 0.123456);
    }

    #[test]
    fn test_mean_uses_only_the_feature_rows() {
        let table = table();
        // Zone Intrusion rows only: 0.2 and 0.4
        let value = lookup_location(&table, "Zone Intrusion", 5, 3, 10, "Gate A");
        assert_eq!(value, 0.3);
    }

    proptest! {
        #[test]
        fn prop_exact_match_returns_stored_value(
            hour in 0u32..24,
            dow in 0u32..7,
            month in 1u32..=12,
            stored in 0.0f64..1.0,
        ) {
            let csv = format!(
                "feature_type,hour,dow,month,Site\nCamera Fault,{hour},{dow},{month},{stored}\n"
            );
            let table = FeatureTable::from_reader(csv.as_bytes()).unwrap();
            let value = lookup_location(&table, "Camera Fault", hour, dow, month, "Site");
            prop_assert_eq!(value, round6(stored));
        }
    }
}
