//! Service Metadata Route

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

const WELCOME: &str = "Welcome to the Location-wise Prediction API";

/// Response for `GET /`
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: String,
    pub usage_example: String,
    pub available_locations: Vec<String>,
}

/// Example query built from the first location, if any
fn usage_example(locations: &[String]) -> String {
    let location = locations.first().map(String::as_str).unwrap_or("Finishing Stand");
    format!(
        "/predict?location={}&start_datetime=2025-10-23T20:00:00&end_datetime=2025-10-23T23:00:00",
        location
    )
}

/// Welcome message, usage example and valid locations
pub async fn get_root(State(state): State<Arc<AppState>>) -> Json<RootResponse> {
    metrics::counter!("forecast_requests_total", "endpoint" => "root").increment(1);
    let locations = state.engine.table().locations();

    Json(RootResponse {
        message: WELCOME.to_string(),
        usage_example: usage_example(locations),
        available_locations: locations.to_vec(),
    })
}
