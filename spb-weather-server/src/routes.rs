//! HTTP routes.
//!
//! The aggregator is shared via `Arc`; providers are immutable, so no locking is needed.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use spb_weather_core::{AggregateError, AggregatedWeather, Aggregator};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub type AppState = Arc<Aggregator>;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/WeatherForecast/weather", get(get_weather))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any aggregation failure becomes a 500 carrying the error text.
pub struct ApiError(AggregateError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}

async fn get_weather(
    State(aggregator): State<AppState>,
) -> Result<Json<AggregatedWeather>, ApiError> {
    aggregator.aggregate().await.map(Json).map_err(ApiError)
}

async fn health() -> &'static str {
    "ok"
}
