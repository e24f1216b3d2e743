use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Geocoding search result offered to the user as a selectable city
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct CitySuggestion {
    pub id: i64,
    pub name: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    /// Pre-formatted "name, region, country" for dropdowns
    pub label: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, ToSchema)]
#[serde(default)]
pub struct WeatherCondition {
    pub text: String,
    pub icon: String,
    pub code: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, ToSchema)]
#[serde(default)]
pub struct LocationData {
    pub name: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub tz_id: String,
    pub localtime_epoch: i64,
    pub localtime: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, ToSchema)]
#[serde(default)]
pub struct CurrentData {
    pub last_updated_epoch: i64,
    pub last_updated: String,
    pub temp_c: f64,
    pub temp_f: f64,
    pub is_day: u8,
    pub condition: WeatherCondition,
    pub wind_mph: f64,
    pub wind_kph: f64,
    pub wind_degree: f64,
    pub wind_dir: String,
    pub pressure_mb: f64,
    pub pressure_in: f64,
    pub precip_mm: f64,
    pub precip_in: f64,
    pub humidity: f64,
    pub cloud: f64,
    pub feelslike_c: f64,
    pub feelslike_f: f64,
    pub vis_km: f64,
    pub vis_miles: f64,
    pub uv: f64,
    pub gust_mph: f64,
    pub gust_kph: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, ToSchema)]
#[serde(default)]
pub struct DayData {
    pub maxtemp_c: f64,
    pub maxtemp_f: f64,
    pub mintemp_c: f64,
    pub mintemp_f: f64,
    pub avgtemp_c: f64,
    pub avgtemp_f: f64,
    pub maxwind_mph: f64,
    pub maxwind_kph: f64,
    pub totalprecip_mm: f64,
    pub avghumidity: f64,
    pub daily_chance_of_rain: f64,
    pub daily_chance_of_snow: f64,
    pub condition: WeatherCondition,
    pub uv: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, ToSchema)]
#[serde(default)]
pub struct Astro {
    pub sunrise: String,
    pub sunset: String,
    pub moonrise: String,
    pub moonset: String,
    pub moon_phase: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, ToSchema)]
#[serde(default)]
pub struct HourData {
    pub time_epoch: i64,
    pub time: String,
    pub temp_c: f64,
    pub temp_f: f64,
    pub is_day: u8,
    pub condition: WeatherCondition,
    pub wind_kph: f64,
    pub wind_mph: f64,
    pub humidity: f64,
    pub feelslike_c: f64,
    pub feelslike_f: f64,
    pub chance_of_rain: f64,
    pub chance_of_snow: f64,
    pub precip_mm: f64,
    pub uv: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, ToSchema)]
#[serde(default)]
pub struct ForecastDay {
    pub date: String,
    pub date_epoch: i64,
    pub day: DayData,
    pub astro: Astro,
    pub hour: Vec<HourData>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, ToSchema)]
#[serde(default)]
pub struct Forecast {
    pub forecastday: Vec<ForecastDay>,
}

/// Raw provider payload: current conditions, location and optional forecast
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, ToSchema)]
#[serde(default)]
pub struct WeatherResponse {
    pub location: LocationData,
    pub current: CurrentData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast: Option<Forecast>,
}

/// Flattened current-weather summary
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct CurrentWeatherSummary {
    pub city: String,
    pub country: String,
    pub localtime: String,
    pub temp_c: f64,
    pub temp_f: f64,
    pub condition: String,
    pub icon: String,
    pub humidity: f64,
    pub wind_kph: f64,
    pub wind_mph: f64,
    pub feelslike_c: f64,
    pub feelslike_f: f64,
    pub uv: f64,
}

/// One day of the daily forecast
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct DailyForecast {
    pub date: String,
    pub date_epoch: i64,
    pub day: DayData,
    pub astro: Astro,
}

/// One hour of the flattened hourly forecast
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct HourlyForecast {
    pub date: String,
    pub time: String,
    pub time_epoch: i64,
    pub temp_c: f64,
    pub temp_f: f64,
    pub condition: WeatherCondition,
    pub wind_kph: f64,
    pub wind_mph: f64,
    pub humidity: f64,
    pub feelslike_c: f64,
    pub feelslike_f: f64,
    pub chance_of_rain: f64,
    pub chance_of_snow: f64,
    pub uv: f64,
}
