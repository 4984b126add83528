//! Location Forecast API - Main Entry Point

use anyhow::Context;
use api::{init_logging, install_metrics, run_server, AppState, ServiceConfig};
use feature_table::FeatureTable;
use forecast_engine::ForecastEngine;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::load().context("loading configuration")?;
    init_logging(&config.logging.level);

    info!("=== Location Forecast API v{} ===", env!("CARGO_PKG_VERSION"));

    // The service cannot answer anything without the table
    let table = FeatureTable::load(&config.table.path)
        .with_context(|| format!("loading feature table {}", config.table.path.display()))?;
    info!("Feature table ready: {:?}", table.summary());

    let engine = ForecastEngine::new(Arc::new(table), config.forecast.clone());
    let mut state = AppState::new(engine);
    if let Some(handle) = install_metrics() {
        state = state.with_metrics(handle);
    }

    run_server(&config, state).await
}
