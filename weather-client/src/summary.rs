use chrono::{DateTime, Utc};
use common::models::WeatherResponse;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    fn is_metric(self) -> bool {
        self == TemperatureUnit::Celsius
    }

    pub fn speed_label(self) -> &'static str {
        if self.is_metric() { "kph" } else { "mph" }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Temperature {
    pub current: i64,
    pub feels_like: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wind {
    pub speed: f64,
    pub dir: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Atmosphere {
    pub humidity: f64,
    pub uv: f64,
    pub visibility: f64,
}

/// Compact view of current conditions in one unit system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSummary {
    pub city: String,
    pub condition: String,
    pub unit: TemperatureUnit,
    pub temp: Temperature,
    pub wind: Wind,
    pub atmosphere: Atmosphere,
    pub is_day: bool,
    pub timestamp: DateTime<Utc>,
}

pub fn summarize(weather: &WeatherResponse, unit: TemperatureUnit) -> WeatherSummary {
    let current = &weather.current;
    let metric = unit.is_metric();
    let pick = |c: f64, f: f64| if metric { c } else { f };

    WeatherSummary {
        city: weather.location.name.clone(),
        condition: current.condition.text.clone(),
        unit,
        temp: Temperature {
            current: pick(current.temp_c, current.temp_f).round() as i64,
            feels_like: pick(current.feelslike_c, current.feelslike_f).round() as i64,
        },
        wind: Wind {
            speed: pick(current.wind_kph, current.wind_mph),
            dir: current.wind_dir.clone(),
        },
        atmosphere: Atmosphere {
            humidity: current.humidity,
            uv: current.uv,
            visibility: pick(current.vis_km, current.vis_miles),
        },
        is_day: current.is_day != 0,
        timestamp: Utc::now(),
    }
}

impl fmt::Display for WeatherSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "The weather in {} is {} at {}°. Wind is {}{}, Humidity is {}%.",
            self.city,
            self.condition,
            self.temp.current,
            self.wind.speed,
            self.unit.speed_label(),
            self.atmosphere.humidity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::{CurrentData, LocationData, WeatherCondition};

    fn pune() -> WeatherResponse {
        WeatherResponse {
            location: LocationData {
                name: "Pune".to_string(),
                country: "India".to_string(),
                ..Default::default()
            },
            current: CurrentData {
                temp_c: 27.6,
                temp_f: 81.7,
                feelslike_c: 29.4,
                feelslike_f: 84.9,
                wind_kph: 14.4,
                wind_mph: 8.9,
                wind_dir: "WNW".to_string(),
                humidity: 62.0,
                vis_km: 10.0,
                vis_miles: 6.0,
                uv: 7.0,
                is_day: 1,
                condition: WeatherCondition {
                    text: "Partly cloudy".to_string(),
                    ..Default::default()
                },
                ..Default::default()
            },
            forecast: None,
        }
    }

    #[test]
    fn metric_summary() {
        let summary = summarize(&pune(), TemperatureUnit::Celsius);
        assert_eq!(summary.temp.current, 28);
        assert_eq!(summary.temp.feels_like, 29);
        assert_eq!(summary.wind.speed, 14.4);
        assert_eq!(summary.atmosphere.visibility, 10.0);
        assert!(summary.is_day);
        assert_eq!(
            summary.to_string(),
            "The weather in Pune is Partly cloudy at 28°. Wind is 14.4kph, Humidity is 62%."
        );
    }

    #[test]
    fn imperial_summary() {
        let summary = summarize(&pune(), TemperatureUnit::Fahrenheit);
        assert_eq!(summary.temp.current, 82);
        assert_eq!(summary.temp.feels_like, 85);
        assert_eq!(summary.wind.speed, 8.9);
        assert_eq!(summary.atmosphere.visibility, 6.0);
        assert!(summary.to_string().contains("Wind is 8.9mph"));
    }
}
