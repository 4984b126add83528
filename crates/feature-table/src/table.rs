//! Table Model

use serde::Serialize;
use std::collections::HashMap;

/// A single location value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Empty or NaN
    Missing,
    /// Parsed numeric value
    Number(f64),
    /// Present but not numeric
    Text(String),
}

impl Cell {
    /// Parse a raw CSV field
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Missing;
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "nan" | "null" | "na" | "n/a" => return Cell::Missing,
            _ => {}
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_nan() => Cell::Missing,
            Ok(v) => Cell::Number(v),
            Err(_) => Cell::Text(trimmed.to_string()),
        }
    }

    /// Numeric value, if any
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

/// One table row
#[derive(Debug, Clone)]
pub struct FeatureRow {
    pub feature_type: Option<String>,
    pub hour: Option<u32>,
    pub dow: Option<u32>,
    pub month: Option<u32>,
    /// One cell per location, in location order
    pub(crate) values: Vec<Cell>,
}

impl FeatureRow {
    /// Whether this row's time key equals (hour, dow, month)
    pub fn matches_time(&self, hour: u32, dow: u32, month: u32) -> bool {
        self.hour == Some(hour) && self.dow == Some(dow) && self.month == Some(month)
    }

    /// Whether this row is an exact match for the full key
    pub fn matches(&self, feature_type: &str, hour: u32, dow: u32, month: u32) -> bool {
        self.feature_type.as_deref() == Some(feature_type) && self.matches_time(hour, dow, month)
    }

    /// Cell for the location at `position`
    pub fn value(&self, position: usize) -> &Cell {
        self.values.get(position).unwrap_or(&Cell::Missing)
    }
}

/// Shape information for logging and health reporting
#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub rows: usize,
    pub columns: usize,
    pub locations: usize,
    pub feature_types: usize,
}

/// (hour, dow, month)
pub(crate) type TimeTriple = (u32, u32, u32);

/// Row positions for one feature type
#[derive(Debug, Default)]
pub(crate) struct FeatureRows {
    /// Every row of the feature, in file order
    pub(crate) rows: Vec<usize>,
    /// First row for each time key
    pub(crate) first_by_time: HashMap<TimeTriple, usize>,
}

/// Immutable feature table
///
/// Rows keep their file order so "first matching row" is well defined when
/// the key is duplicated. The row indexes are built once at load and always
/// point at the first row for a key.
#[derive(Debug)]
pub struct FeatureTable {
    pub(crate) columns: Vec<String>,
    pub(crate) locations: Vec<String>,
    pub(crate) feature_types: Vec<String>,
    pub(crate) rows: Vec<FeatureRow>,
    /// Exact location name -> position
    pub(crate) location_index: HashMap<String, usize>,
    /// Lower-cased location name -> every position sharing it
    pub(crate) normalized_index: HashMap<String, Vec<usize>>,
    /// Feature type -> its rows
    pub(crate) feature_index: HashMap<String, FeatureRows>,
    /// Time key -> first row, any feature type
    pub(crate) time_index: HashMap<TimeTriple, usize>,
}

impl FeatureTable {
    /// All header columns, trimmed, in file order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Valid locations (non-identifier columns)
    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    /// Known feature types in order of first appearance
    pub fn feature_types(&self) -> &[String] {
        &self.feature_types
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_valid_location(&self, location: &str) -> bool {
        self.location_index.contains_key(location)
    }

    /// Position of a location column
    pub fn location_position(&self, location: &str) -> Option<usize> {
        self.location_index.get(location).copied()
    }

    /// Columns whose lower-cased name equals `normalized_key`, in file order.
    ///
    /// Yields each position with the column's stored name.
    pub fn normalized_matches<'a>(
        &'a self,
        normalized_key: &str,
    ) -> impl Iterator<Item = (usize, &'a str)> + 'a {
        self.normalized_index
            .get(normalized_key)
            .into_iter()
            .flatten()
            .map(move |&pos| (pos, self.locations[pos].as_str()))
    }

    /// First row matching the full (feature_type, hour, dow, month) key
    pub fn first_match(
        &self,
        feature_type: &str,
        hour: u32,
        dow: u32,
        month: u32,
    ) -> Option<&FeatureRow> {
        self.feature_index
            .get(feature_type)?
            .first_by_time
            .get(&(hour, dow, month))
            .map(|&i| &self.rows[i])
    }

    /// First row matching (hour, dow, month), whatever its feature type
    pub fn first_time_match(&self, hour: u32, dow: u32, month: u32) -> Option<&FeatureRow> {
        self.time_index.get(&(hour, dow, month)).map(|&i| &self.rows[i])
    }

    /// All rows of one feature type, in file order
    pub fn feature_rows<'a>(
        &'a self,
        feature_type: &str,
    ) -> impl Iterator<Item = &'a FeatureRow> + 'a {
        self.feature_index
            .get(feature_type)
            .into_iter()
            .flat_map(|f| f.rows.iter())
            .map(move |&i| &self.rows[i])
    }

    pub fn summary(&self) -> TableSummary {
        TableSummary {
            rows: self.rows.len(),
            columns: self.columns.len(),
            locations: self.locations.len(),
            feature_types: self.feature_types.len(),
        }
    }
}
