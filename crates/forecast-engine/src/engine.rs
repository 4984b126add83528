//! Forecast Engine Facade

use crate::clock::{Clock, SystemClock};
use crate::error::ForecastError;
use crate::feature_key::{lookup_feature_key, FeatureKeyQuery};
use crate::lookup::lookup_location;
use crate::record::{FeatureKeyPrediction, WindowForecast};
use crate::time::{format_generated, TimeKey};
use crate::window::expand_window;
use feature_table::FeatureTable;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Maximum number of hourly records one window may produce
    pub max_window_hours: u32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            max_window_hours: 8784, // one leap year
        }
    }
}

/// Forecast engine over a shared, immutable feature table
#[derive(Clone)]
pub struct ForecastEngine {
    table: Arc<FeatureTable>,
    clock: Arc<dyn Clock>,
    config: ForecastConfig,
}

impl ForecastEngine {
    /// Create an engine using the system clock
    pub fn new(table: Arc<FeatureTable>, config: ForecastConfig) -> Self {
        Self::with_clock(table, config, Arc::new(SystemClock))
    }

    /// Create an engine with an explicit time source
    pub fn with_clock(
        table: Arc<FeatureTable>,
        config: ForecastConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        info!(
            "Creating forecast engine: {} locations, {} feature types, max window {}h",
            table.locations().len(),
            table.feature_types().len(),
            config.max_window_hours
        );
        Self {
            table,
            clock,
            config,
        }
    }

    pub fn table(&self) -> &FeatureTable {
        &self.table
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Location lookup with mean fallback, rounded to 6 decimals
    pub fn lookup(&self, feature_type: &str, key: TimeKey, location: &str) -> f64 {
        lookup_location(&self.table, feature_type, key.hour, key.dow, key.month, location)
    }

    /// Status-tagged feature-key lookup
    pub fn predict(&self, query: &FeatureKeyQuery) -> FeatureKeyPrediction {
        lookup_feature_key(&self.table, query, format_generated(&self.clock.now()))
    }

    /// Hourly forecast for a location over an optional window
    pub fn expand_window(
        &self,
        location: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<WindowForecast, ForecastError> {
        expand_window(
            &self.table,
            self.clock.as_ref(),
            self.config.max_window_hours,
            location,
            start,
            end,
        )
    }
}

impl std::fmt::Debug for ForecastEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastEngine")
            .field("summary", &self.table.summary())
            .field("config", &self.config)
            .finish()
    }
}
