//! Forecast Engine
//!
//! Hourly risk forecasts over the feature table:
//! - Location lookup with mean fallback
//! - Feature-key lookup with status-tagged fallback
//! - Inclusive hourly window expansion

mod clock;
mod engine;
mod error;
mod feature_key;
mod lookup;
mod record;
mod time;
mod window;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{ForecastConfig, ForecastEngine};
pub use error::ForecastError;
pub use feature_key::{lookup_feature_key, FeatureKeyQuery, DEFAULT_FEATURE_VALUE, KEYED_CATEGORIES};
pub use lookup::{lookup_location, round6};
pub use record::{FeatureKeyPrediction, FeatureValues, LookupStatus, PredictionRecord, WindowForecast};
pub use time::{format_datetime, format_generated, parse_datetime, TimeKey};
pub use window::expand_window;
