pub mod api_client;
pub mod cache;
pub mod config;
pub mod geo_client;
pub mod handlers;
pub mod mapper;
pub mod openapi;

use axum::{Router, routing::get};
use common::errors::AppError;
use common::http_client::HttpClient;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api_client::WeatherApiClient;
use crate::cache::ServerCaches;
use crate::config::Config;
use crate::geo_client::GeoDbClient;
use crate::handlers::AppState;

/// Wire the upstream clients to the given caches.
pub fn build_state(config: &Config, caches: &ServerCaches) -> Result<AppState, AppError> {
    let http_client = Arc::new(HttpClient::new(config.upstream_timeout_seconds)?);

    let weather = Arc::new(WeatherApiClient::new(
        http_client.clone(),
        caches.forecast.clone(),
        config.weather_api_url.clone(),
        config.weather_api_key.clone(),
    ));
    let geo = Arc::new(GeoDbClient::new(
        http_client,
        caches.search.clone(),
        config.geo_api_url.clone(),
        config.rapid_api_key.clone(),
        config.rapid_api_host.clone(),
    ));

    Ok(AppState { weather, geo })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/search", get(handlers::search))
        .route("/api/weather", get(handlers::get_weather))
        .route("/api/current_weather", get(handlers::get_current_weather))
        .route("/api/daily_forecast", get(handlers::get_daily_forecast))
        .route("/api/hourly_forecast", get(handlers::get_hourly_forecast))
        .merge(openapi::swagger_ui())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
