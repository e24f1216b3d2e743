use axum::{
    extract::{Query, State},
    response::Json,
};
use common::errors::AppError;
use common::models::{
    CitySuggestion, CurrentWeatherSummary, DailyForecast, HourlyForecast, WeatherResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::api_client::WeatherApiClient;
use crate::geo_client::GeoDbClient;
use crate::mapper;

pub const MIN_FORECAST_DAYS: i64 = 1;
pub const MAX_FORECAST_DAYS: i64 = 14;
const DEFAULT_FORECAST_DAYS: i64 = 1;

#[derive(Clone)]
pub struct AppState {
    pub weather: Arc<WeatherApiClient>,
    pub geo: Arc<GeoDbClient>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct CityQuery {
    pub city: Option<String>,
}

#[derive(Deserialize)]
pub struct ForecastQuery {
    pub city: Option<String>,
    /// Kept as text so a malformed value defaults instead of rejecting the request.
    pub days: Option<String>,
}

fn require_city(city: Option<String>) -> Result<String, AppError> {
    city.map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::validation("City parameter is required"))
}

/// Absent or non-numeric means the default; a leading integer must lie in 1..=14.
pub fn parse_days(raw: Option<&str>) -> Result<u8, AppError> {
    let days = raw
        .and_then(leading_integer)
        .unwrap_or(DEFAULT_FORECAST_DAYS);

    if !(MIN_FORECAST_DAYS..=MAX_FORECAST_DAYS).contains(&days) {
        return Err(AppError::validation(format!(
            "Forecast is only available for {} to {} days.",
            MIN_FORECAST_DAYS, MAX_FORECAST_DAYS
        )));
    }

    u8::try_from(days).map_err(|_| AppError::validation("Invalid days parameter"))
}

/// Optional sign and leading digits, trailing text ignored (`"15.5"` is 15, `"20days"` is 20).
/// Digit runs too long for `i64` saturate, so they still fail the range check.
fn leading_integer(raw: &str) -> Option<i64> {
    let s = raw.trim();
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    let len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }

    let magnitude = rest[..len].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health check")
    )
)]
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "service": "weather-service" }))
}

#[utoipa::path(
    get,
    path = "/api/search",
    params(
        ("q" = String, Query, description = "City name prefix (at least 3 characters to get results)")
    ),
    responses(
        (status = 200, description = "Matching cities", body = [CitySuggestion]),
        (status = 400, description = "Missing query"),
        (status = 500, description = "Failed to fetch cities")
    ),
    tag = "search"
)]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<CitySuggestion>>, AppError> {
    let query = params
        .q
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| AppError::validation("Query is required"))?;

    info!(query = %query, "Search request received");

    let suggestions = state.geo.search_cities(&query).await.map_err(|e| {
        error!(error = %e, "City search unavailable");
        AppError::upstream("Failed to fetch cities")
    })?;

    Ok(Json(suggestions))
}

#[utoipa::path(
    get,
    path = "/api/weather",
    params(
        ("city" = String, Query, description = "City name or \"lat,lon\"")
    ),
    responses(
        (status = 200, description = "Raw current conditions and location", body = WeatherResponse),
        (status = 400, description = "Missing city"),
        (status = 500, description = "Upstream error")
    ),
    tag = "weather"
)]
pub async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<CityQuery>,
) -> Result<Json<WeatherResponse>, AppError> {
    let city = require_city(params.city)?;
    info!(city = %city, "Weather request received");

    let weather = state.weather.get_weather(&city, 1).await?;

    Ok(Json(weather))
}

#[utoipa::path(
    get,
    path = "/api/current_weather",
    params(
        ("city" = String, Query, description = "City name or \"lat,lon\"")
    ),
    responses(
        (status = 200, description = "Flattened current-weather summary", body = CurrentWeatherSummary),
        (status = 400, description = "Missing city"),
        (status = 500, description = "Upstream error")
    ),
    tag = "weather"
)]
pub async fn get_current_weather(
    State(state): State<AppState>,
    Query(params): Query<CityQuery>,
) -> Result<Json<CurrentWeatherSummary>, AppError> {
    let city = require_city(params.city)?;
    info!(city = %city, "Current weather request received");

    let weather = state.weather.get_weather(&city, 1).await?;

    Ok(Json(mapper::map_current_weather(&weather)))
}

#[utoipa::path(
    get,
    path = "/api/daily_forecast",
    params(
        ("city" = String, Query, description = "City name or \"lat,lon\""),
        ("days" = Option<u8>, Query, description = "Number of days (1-14, default 1)")
    ),
    responses(
        (status = 200, description = "Per-day forecast", body = [DailyForecast]),
        (status = 400, description = "Missing city or days out of range"),
        (status = 500, description = "Upstream error")
    ),
    tag = "forecast"
)]
pub async fn get_daily_forecast(
    State(state): State<AppState>,
    Query(params): Query<ForecastQuery>,
) -> Result<Json<Vec<DailyForecast>>, AppError> {
    let city = require_city(params.city)?;
    let days = parse_days(params.days.as_deref())?;
    info!(city = %city, days, "Daily forecast request received");

    let weather = state.weather.get_weather(&city, days).await?;

    Ok(Json(mapper::map_daily_forecast(&weather)))
}

#[utoipa::path(
    get,
    path = "/api/hourly_forecast",
    params(
        ("city" = String, Query, description = "City name or \"lat,lon\""),
        ("days" = Option<u8>, Query, description = "Number of days (1-14, default 1)")
    ),
    responses(
        (status = 200, description = "Per-hour forecast across all requested days", body = [HourlyForecast]),
        (status = 400, description = "Missing city or days out of range"),
        (status = 500, description = "Upstream error")
    ),
    tag = "forecast"
)]
pub async fn get_hourly_forecast(
    State(state): State<AppState>,
    Query(params): Query<ForecastQuery>,
) -> Result<Json<Vec<HourlyForecast>>, AppError> {
    let city = require_city(params.city)?;
    let days = parse_days(params.days.as_deref())?;
    info!(city = %city, days, "Hourly forecast request received");

    let weather = state.weather.get_weather(&city, days).await?;

    Ok(Json(mapper::map_hourly_forecast(&weather)))
}
