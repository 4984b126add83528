//! Location Forecast API Server
//!
//! HTTP API serving hourly risk forecasts per location.

use anyhow::Context;
use axum::{routing::get, Router};
use forecast_engine::ForecastEngine;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::GovernorLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub mod config;
pub mod rate_limit;
mod routes;

pub use crate::config::ServiceConfig;
pub use routes::predict::{ErrorResponse, PredictQuery};

/// Application state shared across handlers.
///
/// The table behind the engine is immutable, so no lock is needed.
pub struct AppState {
    /// Forecast engine over the loaded table
    pub engine: ForecastEngine,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Prometheus handle, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state
    pub fn new(engine: ForecastEngine) -> Self {
        Self {
            engine,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::root::get_root))
        .route("/predict", get(routes::predict::get_predict))
        .route("/health", get(routes::health::get_health))
        .route("/metrics", get(routes::prometheus::get_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize logging. `RUST_LOG` takes precedence over `default_level`.
pub fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Install the global Prometheus recorder
pub fn install_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Metrics recorder not installed: {}", e);
            None
        }
    }
}

/// Run the server until ctrl-c
pub async fn run_server(config: &ServiceConfig, state: AppState) -> anyhow::Result<()> {
    let mut app = create_router(Arc::new(state));

    if config.rate_limit.enabled {
        let governor = rate_limit::create_governor_config(&config.rate_limit)
            .context("rate_limit.per_second and rate_limit.burst_size must be non-zero")?;
        info!(
            "Rate limiting enabled: burst {}, one request per {}s",
            config.rate_limit.burst_size, config.rate_limit.per_second
        );
        app = app.layer(GovernorLayer { config: governor });
    }

    let addr = &config.server.bind_addr;
    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use feature_table::FeatureTable;
    use forecast_engine::{FixedClock, ForecastConfig};
    use serde_json::Value;
    use tower::ServiceExt;

    const TABLE: &str = "\
feature_type,hour,dow,month,Finishing Stand,Gate A
Camera Fault,20,3,10,0.11,0.21
Helmet Not Detected,20,3,10,0.12,0.22
Zone Intrusion,20,3,10,0.13,0.23
";

    fn app() -> Router {
        let table = FeatureTable::from_reader(TABLE.as_bytes()).unwrap();
        let now = NaiveDate::from_ymd_opt(2025, 10, 23)
            .unwrap()
            .and_hms_opt(19, 0, 0)
            .unwrap();
        let engine = ForecastEngine::with_clock(
            Arc::new(table),
            ForecastConfig::default(),
            Arc::new(FixedClock(now)),
        );
        create_router(Arc::new(AppState::new(engine)))
    }

    async fn get(uri: &str) -> (StatusCode, Value) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_root_lists_locations() {
        let (status, body) = get("/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["available_locations"],
            serde_json::json!(["Finishing Stand", "Gate A"])
        );
        assert!(body["usage_example"]
            .as_str()
            .unwrap()
            .starts_with("/predict?location=Finishing Stand"));
        assert!(body["message"].as_str().unwrap().contains("Welcome"));
    }

    #[tokio::test]
    async fn test_predict_window() {
        let (status, body) = get(
            "/predict?location=Gate%20A&start_datetime=2025-10-23T20:00:00&end_datetime=2025-10-23T23:00:00",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["location"], "Gate A");
        assert_eq!(body["total_predictions"], 4);
        assert_eq!(body["start_datetime"], "2025-10-23T20:00:00");
        assert_eq!(body["end_datetime"], "2025-10-23T23:00:00");

        let first = &body["predictions"][0];
        assert_eq!(first["datetime"], "2025-10-23T20:00:00");
        assert_eq!(first["location"], "Gate A");
        assert_eq!(first["predictions"]["Camera Fault"], 0.21);
        assert_eq!(first["predictions"]["Zone Intrusion"], 0.23);
        assert_eq!(first["timestamp"], "2025-10-23T19:00:00.000000");
        assert_eq!(body["predictions"][3]["datetime"], "2025-10-23T23:00:00");
    }

    #[tokio::test]
    async fn test_predict_default_window() {
        let (status, body) = get("/predict?location=Finishing%20Stand").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_predictions"], 4);
        assert_eq!(body["start_datetime"], "2025-10-23T20:00:00");
        assert_eq!(body["end_datetime"], "2025-10-23T23:00:00");
    }

    #[tokio::test]
    async fn test_invalid_location_is_200_error() {
        let (status, body) = get("/predict?location=Nowhere").await;

        assert_eq!(status, StatusCode::OK);
        let error = body["error"].as_str().unwrap();
        assert!(error.contains("Invalid location 'Nowhere'"));
        assert!(error.contains("Finishing Stand"));
        assert!(error.contains("Gate A"));
        assert!(body.get("predictions").is_none());
    }

    #[tokio::test]
    async fn test_bad_datetime_is_200_error() {
        let (status, body) =
            get("/predict?location=Gate%20A&start_datetime=yesterday&end_datetime=2025-10-23T23:00:00")
                .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["error"].as_str().unwrap().contains("yesterday"));
    }

    #[tokio::test]
    async fn test_missing_location() {
        let (status, body) = get("/predict").await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("location"));
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get("/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["table"]["rows"], 3);
        assert_eq!(body["table"]["locations"], 2);
        assert_eq!(body["table"]["feature_types"], 3);
    }

    #[tokio::test]
    async fn test_metrics_without_recorder() {
        let response = app()
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
