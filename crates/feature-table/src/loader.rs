//! CSV Loading

use crate::table::{Cell, FeatureRow, FeatureRows, FeatureTable, TimeTriple};
use crate::{
    TableError, DEFAULT_FEATURE_TYPES, DOW_COLUMN, FEATURE_TYPE_COLUMN, HOUR_COLUMN,
    IDENTIFIER_COLUMNS, MONTH_COLUMN,
};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

impl FeatureTable {
    /// Load the table from a CSV file.
    ///
    /// Expected format:
    /// ```csv
    /// feature_type,hour,dow,month,Finishing Stand,Roughing Mill
    /// Camera Fault,20,3,10,0.12,0.08
    /// ```
    pub fn load(path: &Path) -> Result<Self, TableError> {
        let file = File::open(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(file)?;

        info!(
            "Loaded {}: {} rows x {} columns",
            path.display(),
            table.row_count(),
            table.columns.len()
        );
        Ok(table)
    }

    /// Build the table from any CSV source with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::None)
            .from_reader(reader);

        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|c| c.trim().to_string())
            .collect();

        let position = |name: &str| columns.iter().position(|c| c == name);
        let hour_pos = position(HOUR_COLUMN).ok_or(TableError::MissingColumn(HOUR_COLUMN))?;
        let dow_pos = position(DOW_COLUMN).ok_or(TableError::MissingColumn(DOW_COLUMN))?;
        let month_pos = position(MONTH_COLUMN).ok_or(TableError::MissingColumn(MONTH_COLUMN))?;
        let feature_pos = position(FEATURE_TYPE_COLUMN);

        // (header position, location name)
        let location_cols: Vec<(usize, String)> = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !IDENTIFIER_COLUMNS.contains(&c.as_str()))
            .map(|(i, c)| (i, c.clone()))
            .collect();

        if location_cols.is_empty() {
            warn!("No location columns found in feature table");
        }

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let field = |i: usize| record.get(i).unwrap_or("");

            let feature_type = feature_pos
                .map(|i| field(i).trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string);

            rows.push(FeatureRow {
                feature_type,
                hour: parse_key(field(hour_pos)),
                dow: parse_key(field(dow_pos)),
                month: parse_key(field(month_pos)),
                values: location_cols.iter().map(|(i, _)| Cell::parse(field(*i))).collect(),
            });
        }

        let feature_types: Vec<String> = match feature_pos {
            Some(_) => {
                let mut seen = HashSet::new();
                rows.iter()
                    .filter_map(|r| r.feature_type.as_deref())
                    .filter(|f| seen.insert(*f))
                    .map(str::to_string)
                    .collect()
            }
            None => {
                warn!("No feature_type column, using default feature types");
                DEFAULT_FEATURE_TYPES.iter().map(|s| s.to_string()).collect()
            }
        };

        let locations: Vec<String> = location_cols.into_iter().map(|(_, c)| c).collect();
        let mut location_index = HashMap::with_capacity(locations.len());
        let mut normalized_index: HashMap<String, Vec<usize>> = HashMap::new();
        for (pos, name) in locations.iter().enumerate() {
            location_index.entry(name.clone()).or_insert(pos);
            normalized_index.entry(name.to_lowercase()).or_default().push(pos);
        }

        let (feature_index, time_index) = index_rows(&rows);

        info!("Valid locations: {:?}", locations);
        debug!("Feature types: {:?}", feature_types);

        Ok(Self {
            columns,
            locations,
            feature_types,
            rows,
            location_index,
            normalized_index,
            feature_index,
            time_index,
        })
    }
}

/// Row indexes keyed by feature type and by time. Rows with an unparseable
/// key never match and are left out of the time maps.
fn index_rows(
    rows: &[FeatureRow],
) -> (HashMap<String, FeatureRows>, HashMap<TimeTriple, usize>) {
    let mut feature_index: HashMap<String, FeatureRows> = HashMap::new();
    let mut time_index = HashMap::new();

    for (i, row) in rows.iter().enumerate() {
        let time = match (row.hour, row.dow, row.month) {
            (Some(h), Some(d), Some(m)) => Some((h, d, m)),
            _ => None,
        };
        if let Some(time) = time {
            time_index.entry(time).or_insert(i);
        }

        if let Some(feature_type) = &row.feature_type {
            let entry = feature_index.entry(feature_type.clone()).or_default();
            entry.rows.push(i);
            if let Some(time) = time {
                entry.first_by_time.entry(time).or_insert(i);
            }
        }
    }

    (feature_index, time_index)
}

/// Parse an integer key cell, accepting `7` and `7.0`
fn parse_key(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<u32>() {
        return Some(v);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 => {
            Some(v as u32)
        }
        _ => None,
    }
}
