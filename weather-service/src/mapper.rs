//! Reshape provider payloads into the response shapes the dashboard consumes.

use common::models::{
    CurrentWeatherSummary, DailyForecast, ForecastDay, HourlyForecast, WeatherResponse,
};

pub fn map_current_weather(data: &WeatherResponse) -> CurrentWeatherSummary {
    let current = &data.current;
    CurrentWeatherSummary {
        city: data.location.name.clone(),
        country: data.location.country.clone(),
        localtime: data.location.localtime.clone(),
        temp_c: current.temp_c,
        temp_f: current.temp_f,
        condition: current.condition.text.clone(),
        icon: current.condition.icon.clone(),
        humidity: current.humidity,
        wind_kph: current.wind_kph,
        wind_mph: current.wind_mph,
        feelslike_c: current.feelslike_c,
        feelslike_f: current.feelslike_f,
        uv: current.uv,
    }
}

pub fn map_daily_forecast(data: &WeatherResponse) -> Vec<DailyForecast> {
    forecast_days(data)
        .iter()
        .map(|day| DailyForecast {
            date: day.date.clone(),
            date_epoch: day.date_epoch,
            day: day.day.clone(),
            astro: day.astro.clone(),
        })
        .collect()
}

/// Every hour of every forecast day, in order.
pub fn map_hourly_forecast(data: &WeatherResponse) -> Vec<HourlyForecast> {
    forecast_days(data)
        .iter()
        .flat_map(|day| {
            day.hour.iter().map(move |hour| HourlyForecast {
                date: day.date.clone(),
                time: hour.time.clone(),
                time_epoch: hour.time_epoch,
                temp_c: hour.temp_c,
                temp_f: hour.temp_f,
                condition: hour.condition.clone(),
                wind_kph: hour.wind_kph,
                wind_mph: hour.wind_mph,
                humidity: hour.humidity,
                feelslike_c: hour.feelslike_c,
                feelslike_f: hour.feelslike_f,
                chance_of_rain: hour.chance_of_rain,
                chance_of_snow: hour.chance_of_snow,
                uv: hour.uv,
            })
        })
        .collect()
}

fn forecast_days(data: &WeatherResponse) -> &[ForecastDay] {
    data.forecast
        .as_ref()
        .map(|forecast| forecast.forecastday.as_slice())
        .unwrap_or_default()
}
