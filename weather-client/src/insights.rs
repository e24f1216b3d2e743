//! Rule-based readings of the weather: activity suitability, live alerts and the daily verdict.

use common::models::{CurrentData, DayData};
use serde::Serialize;

use crate::summary::TemperatureUnit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    Running,
    Driving,
    Picnic,
    Hiking,
}

impl Activity {
    pub const ALL: [Activity; 4] = [
        Activity::Running,
        Activity::Driving,
        Activity::Picnic,
        Activity::Hiking,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Activity::Running => "Running",
            Activity::Driving => "Driving",
            Activity::Picnic => "Picnic/BBQ",
            Activity::Hiking => "Hiking",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rating {
    Great,
    Fair,
    Poor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityScore {
    pub activity: Activity,
    /// 0..=10
    pub score: u8,
    pub rating: Rating,
    pub reason: &'static str,
}

/// Start at 10 and apply each penalty that matches; the last matching rule names the reason.
pub fn score_activity(activity: Activity, current: &CurrentData) -> ActivityScore {
    let mut score: i32 = 10;
    let mut reason = "Perfect conditions";

    let mut penalize = |hit: bool, penalty: i32, why: &'static str| {
        if hit {
            score -= penalty;
            reason = why;
        }
    };

    match activity {
        Activity::Running => {
            penalize(current.temp_c > 30.0, 4, "Too hot");
            penalize(current.temp_c < 5.0, 3, "Chilly");
            penalize(current.precip_mm > 0.5, 5, "Raining");
            penalize(current.humidity > 80.0, 2, "Humid");
        }
        Activity::Driving => {
            penalize(current.vis_km < 5.0, 5, "Low Visibility");
            penalize(current.precip_mm > 2.0, 3, "Wet Roads");
            penalize(current.wind_kph > 50.0, 4, "High Winds");
        }
        Activity::Picnic => {
            // Any rain rules a picnic out outright.
            if current.precip_mm > 0.0 {
                penalize(true, 10, "Raining");
            }
            penalize(current.temp_c < 15.0, 4, "Too Cold");
            penalize(current.wind_kph > 20.0, 3, "Windy");
        }
        Activity::Hiking => {
            penalize(current.precip_mm > 0.0, 6, "Muddy/Wet");
            penalize(current.uv > 7.0, 2, "High UV");
            penalize(current.vis_km < 9.0, 2, "No Views");
        }
    }

    let score = score.clamp(0, 10) as u8;
    let rating = match score {
        0..=3 => Rating::Poor,
        4..=6 => Rating::Fair,
        _ => Rating::Great,
    };

    ActivityScore {
        activity,
        score,
        rating,
        reason,
    }
}

pub fn activity_scores(current: &CurrentData) -> Vec<ActivityScore> {
    Activity::ALL
        .iter()
        .map(|&activity| score_activity(activity, current))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherAlert {
    /// Slug of the message, stable across refreshes.
    pub id: String,
    pub severity: Severity,
    pub message: String,
}

impl WeatherAlert {
    fn new(severity: Severity, message: String) -> Self {
        let id = message
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
            .to_lowercase();
        Self {
            id,
            severity,
            message,
        }
    }
}

/// Alerts for current conditions, plus today's forecast when it is known.
pub fn live_alerts(current: &CurrentData, today: Option<&DayData>) -> Vec<WeatherAlert> {
    let mut alerts = Vec::new();
    let mut add = |severity, message: String| alerts.push(WeatherAlert::new(severity, message));

    // Integer degrees: -0.4 prints as 0, never -0.
    let temp = current.temp_c.round() as i64;
    if current.temp_c > 40.0 {
        add(
            Severity::Critical,
            format!("Extreme heat warning ({}°C). Stay hydrated.", temp),
        );
    } else if current.temp_c > 35.0 {
        add(
            Severity::Warning,
            format!("High temperature detected ({}°C).", temp),
        );
    } else if current.temp_c < 0.0 {
        add(
            Severity::Critical,
            format!("Freezing conditions detected ({}°C).", temp),
        );
    } else if current.temp_c < 10.0 {
        add(
            Severity::Info,
            "Low temperature advisory. Dress warmly.".to_string(),
        );
    }

    if current.wind_kph > 60.0 {
        add(
            Severity::Critical,
            format!("Dangerous wind speeds of {} km/h.", current.wind_kph),
        );
    } else if current.wind_kph > 30.0 {
        add(
            Severity::Warning,
            format!("Strong winds detected ({} km/h).", current.wind_kph),
        );
    }

    if current.precip_mm > 5.0 {
        add(Severity::Warning, "Heavy rain detected.".to_string());
    } else if current.precip_mm > 0.5 {
        add(Severity::Info, "Light rain occurring.".to_string());
    }

    if let Some(today) = today {
        if today.daily_chance_of_rain > 70.0 && current.precip_mm == 0.0 {
            add(
                Severity::Info,
                format!(
                    "High chance of rain ({}%) expected later.",
                    today.daily_chance_of_rain
                ),
            );
        }
        if today.daily_chance_of_snow > 50.0 {
            add(Severity::Warning, "Snowfall expected today.".to_string());
        }
    }

    if current.vis_km < 1.0 {
        add(
            Severity::Warning,
            "Very low visibility (<1km). Drive carefully.".to_string(),
        );
    }
    if current.uv > 8.0 {
        add(
            Severity::Critical,
            format!("Extreme UV Index ({}). Avoid direct sunlight.", current.uv),
        );
    } else if current.uv > 5.0 {
        add(
            Severity::Warning,
            format!("High UV Index ({}). Wear sunscreen.", current.uv),
        );
    }

    alerts
}

/// One-line outlook for the day. The max temperature is read in `unit`; first match wins.
pub fn daily_verdict(today: &DayData, unit: TemperatureUnit) -> &'static str {
    let max_temp = match unit {
        TemperatureUnit::Celsius => today.maxtemp_c,
        TemperatureUnit::Fahrenheit => today.maxtemp_f,
    };

    if today.daily_chance_of_rain > 60.0 {
        "Keep an umbrella close."
    } else if max_temp > 30.0 {
        "It's going to be a hot one."
    } else if max_temp < 5.0 {
        "Dress warmly, it's freezing."
    } else {
        "Perfect weather for a walk."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mild() -> CurrentData {
        CurrentData {
            temp_c: 22.0,
            humidity: 50.0,
            wind_kph: 10.0,
            precip_mm: 0.0,
            vis_km: 10.0,
            uv: 3.0,
            ..Default::default()
        }
    }

    #[test]
    fn mild_weather_is_great_for_everything() {
        for score in activity_scores(&mild()) {
            assert_eq!(score.score, 10, "{:?}", score.activity);
            assert_eq!(score.rating, Rating::Great);
            assert_eq!(score.reason, "Perfect conditions");
        }
    }

    #[test]
    fn hot_humid_running_keeps_last_reason() {
        let current = CurrentData {
            temp_c: 33.0,
            humidity: 85.0,
            ..mild()
        };
        let score = score_activity(Activity::Running, &current);
        assert_eq!(score.score, 4);
        assert_eq!(score.rating, Rating::Fair);
        assert_eq!(score.reason, "Humid");
    }

    #[test]
    fn any_rain_ruins_a_picnic() {
        let current = CurrentData {
            precip_mm: 0.1,
            temp_c: 12.0,
            ..mild()
        };
        let score = score_activity(Activity::Picnic, &current);
        assert_eq!(score.score, 0);
        assert_eq!(score.rating, Rating::Poor);
        assert_eq!(score.reason, "Too Cold");
    }

    #[test]
    fn foggy_stormy_driving_is_clamped_at_zero() {
        let current = CurrentData {
            vis_km: 0.5,
            precip_mm: 8.0,
            wind_kph: 70.0,
            ..mild()
        };
        let score = score_activity(Activity::Driving, &current);
        assert_eq!(score.score, 0);
        assert_eq!(score.reason, "High Winds");
    }

    #[test]
    fn hiking_in_haze_is_fair() {
        let current = CurrentData {
            uv: 8.0,
            vis_km: 6.0,
            ..mild()
        };
        let score = score_activity(Activity::Hiking, &current);
        assert_eq!(score.score, 6);
        assert_eq!(score.rating, Rating::Fair);
    }

    #[test]
    fn calm_day_has_no_alerts() {
        assert!(live_alerts(&mild(), None).is_empty());
    }

    #[test]
    fn extreme_conditions_raise_critical_alerts() {
        let current = CurrentData {
            temp_c: 42.4,
            wind_kph: 65.0,
            uv: 9.0,
            ..mild()
        };
        let alerts = live_alerts(&current, None);
        let messages: Vec<&str> = alerts.iter().map(|a| a.message.as_str()).collect();

        assert_eq!(
            messages,
            [
                "Extreme heat warning (42°C). Stay hydrated.",
                "Dangerous wind speeds of 65 km/h.",
                "Extreme UV Index (9). Avoid direct sunlight.",
            ]
        );
        assert!(alerts.iter().all(|a| a.severity == Severity::Critical));
        assert_eq!(alerts[1].id, "dangerous-wind-speeds-of-65-km/h.");
    }

    #[test]
    fn forecast_rain_only_alerts_when_dry_now() {
        let today = DayData {
            daily_chance_of_rain: 85.0,
            daily_chance_of_snow: 60.0,
            ..Default::default()
        };

        let dry = live_alerts(&mild(), Some(&today));
        assert_eq!(dry.len(), 2);
        assert_eq!(dry[0].message, "High chance of rain (85%) expected later.");
        assert_eq!(dry[1].severity, Severity::Warning);

        let wet = CurrentData {
            precip_mm: 1.0,
            ..mild()
        };
        let alerts = live_alerts(&wet, Some(&today));
        assert_eq!(alerts[0].message, "Light rain occurring.");
        assert!(!alerts.iter().any(|a| a.message.starts_with("High chance of rain")));
    }

    #[test]
    fn freezing_alert_never_shows_negative_zero() {
        let current = CurrentData {
            temp_c: -0.3,
            ..mild()
        };
        let alerts = live_alerts(&current, None);
        assert_eq!(alerts[0].message, "Freezing conditions detected (0°C).");
        assert_eq!(alerts[0].severity, Severity::Critical);
    }

    fn day(max_c: f64, max_f: f64, rain: f64) -> DayData {
        DayData {
            maxtemp_c: max_c,
            maxtemp_f: max_f,
            daily_chance_of_rain: rain,
            ..Default::default()
        }
    }

    #[test]
    fn rain_outranks_heat_in_the_verdict() {
        let today = day(34.0, 93.2, 75.0);
        assert_eq!(
            daily_verdict(&today, TemperatureUnit::Celsius),
            "Keep an umbrella close."
        );
    }

    #[test]
    fn hot_day_verdict() {
        assert_eq!(
            daily_verdict(&day(31.0, 87.8, 10.0), TemperatureUnit::Celsius),
            "It's going to be a hot one."
        );
    }

    #[test]
    fn freezing_day_verdict() {
        assert_eq!(
            daily_verdict(&day(2.0, 35.6, 0.0), TemperatureUnit::Celsius),
            "Dress warmly, it's freezing."
        );
    }

    #[test]
    fn mild_day_verdict() {
        assert_eq!(
            daily_verdict(&day(22.0, 71.6, 60.0), TemperatureUnit::Celsius),
            "Perfect weather for a walk."
        );
    }

    #[test]
    fn verdict_reads_max_temperature_in_the_chosen_unit() {
        // 22°C is 71.6°F, which clears the 30-degree threshold in Fahrenheit.
        assert_eq!(
            daily_verdict(&day(22.0, 71.6, 0.0), TemperatureUnit::Fahrenheit),
            "It's going to be a hot one."
        );
        assert_eq!(
            daily_verdict(&day(-17.0, 1.4, 0.0), TemperatureUnit::Fahrenheit),
            "Dress warmly, it's freezing."
        );
    }
}
