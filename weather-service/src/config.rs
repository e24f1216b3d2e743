use common::tracing::LogFormat;
use std::env;

pub struct Config {
    pub port: u16,
    pub weather_api_url: String,
    pub weather_api_key: Option<String>,
    pub geo_api_url: String,
    pub rapid_api_key: Option<String>,
    pub rapid_api_host: String,
    pub search_cache_ttl_seconds: u64,
    pub weather_cache_ttl_seconds: u64,
    pub cache_sweep_interval_seconds: u64,
    pub upstream_timeout_seconds: u64,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            weather_api_url: env::var("WEATHER_API")
                .unwrap_or_else(|_| "https://api.weatherapi.com/v1/forecast.json".to_string()),
            weather_api_key: non_empty("WEATHER_API_KEY"),
            geo_api_url: env::var("GEO_API")
                .unwrap_or_else(|_| "https://wft-geo-db.p.rapidapi.com/v1/geo/cities".to_string()),
            rapid_api_key: non_empty("RAPID_API_KEY"),
            rapid_api_host: env::var("RAPID_API_HOST")
                .unwrap_or_else(|_| "wft-geo-db.p.rapidapi.com".to_string()),
            search_cache_ttl_seconds: parse_or("SEARCH_CACHE_TTL_SECONDS", 24 * 60 * 60),
            weather_cache_ttl_seconds: parse_or("WEATHER_CACHE_TTL_SECONDS", 600), // 10 minutes
            cache_sweep_interval_seconds: parse_or("CACHE_SWEEP_INTERVAL_SECONDS", 120),
            upstream_timeout_seconds: parse_or("UPSTREAM_TIMEOUT_SECONDS", 10),
            log_format: env::var("LOG_FORMAT")
                .ok()
                .and_then(|f| f.parse().ok())
                .unwrap_or_default(),
        }
    }
}

fn parse_or(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
