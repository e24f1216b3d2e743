use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use common::models::{
    Astro, CitySuggestion, CurrentData, CurrentWeatherSummary, DailyForecast, DayData, Forecast,
    ForecastDay, HourData, HourlyForecast, LocationData, WeatherCondition, WeatherResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::search,
        handlers::get_weather,
        handlers::get_current_weather,
        handlers::get_daily_forecast,
        handlers::get_hourly_forecast,
    ),
    components(schemas(
        CitySuggestion,
        WeatherResponse,
        LocationData,
        CurrentData,
        WeatherCondition,
        Forecast,
        ForecastDay,
        DayData,
        Astro,
        HourData,
        CurrentWeatherSummary,
        DailyForecast,
        HourlyForecast,
    )),
    tags(
        (name = "search", description = "City geocoding search"),
        (name = "weather", description = "Current conditions"),
        (name = "forecast", description = "Daily and hourly forecasts"),
    ),
)]
struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
