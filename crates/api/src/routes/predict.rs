//! Prediction Route

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use forecast_engine::ForecastError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::AppState;

/// Query parameters for the predict endpoint
#[derive(Debug, Deserialize)]
pub struct PredictQuery {
    /// Location column name
    pub location: Option<String>,
    /// Window start, ISO 8601
    pub start_datetime: Option<String>,
    /// Window end, ISO 8601
    pub end_datetime: Option<String>,
}

/// Error body. Forecast errors are returned with status 200.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<ForecastError> for ErrorResponse {
    fn from(err: ForecastError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

/// Hourly forecast for a location.
///
/// Without a window this covers now+1h through now+4h.
pub async fn get_predict(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PredictQuery>,
) -> Response {
    metrics::counter!("forecast_requests_total", "endpoint" => "predict").increment(1);

    let Some(location) = params.location.as_deref() else {
        metrics::counter!("forecast_errors_total", "kind" => "missing_location").increment(1);
        let body = ErrorResponse {
            error: "Missing required query parameter: location".to_string(),
        };
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
    };

    let result = state.engine.expand_window(
        location,
        params.start_datetime.as_deref(),
        params.end_datetime.as_deref(),
    );

    match result {
        Ok(forecast) => {
            info!(
                location,
                total = forecast.total_predictions,
                "Served forecast {} .. {}",
                forecast.start_datetime,
                forecast.end_datetime
            );
            metrics::counter!("forecast_predictions_total")
                .increment(forecast.total_predictions as u64);
            Json(forecast).into_response()
        }
        Err(err) => {
            warn!(location, kind = err.kind(), "Prediction request rejected: {}", err);
            metrics::counter!("forecast_errors_total", "kind" => err.kind()).increment(1);
            Json(ErrorResponse::from(err)).into_response()
        }
    }
}
