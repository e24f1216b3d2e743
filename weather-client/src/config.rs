use std::env;
use std::path::PathBuf;

pub struct ClientConfig {
    pub server_url: String,
    pub cache_ttl_seconds: u64,
    pub cache_sweep_seconds: u64,
    pub timeout_seconds: u64,
    pub forecast_days: u8,
    /// Where recent searches are persisted; in-memory only when unset.
    pub history_dir: Option<PathBuf>,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            server_url: env::var("WEATHER_SERVER_URL")
                .unwrap_or_else(|_| "http://localhost:8000/api".to_string()),
            cache_ttl_seconds: env::var("CLIENT_CACHE_TTL_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300), // 5 minutes default
            cache_sweep_seconds: env::var("CLIENT_CACHE_SWEEP_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
            timeout_seconds: env::var("CLIENT_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            forecast_days: env::var("FORECAST_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
            history_dir: env::var("HISTORY_DIR").ok().map(PathBuf::from),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8000/api".to_string(),
            cache_ttl_seconds: 300,
            cache_sweep_seconds: 60,
            timeout_seconds: 10,
            forecast_days: 3,
            history_dir: None,
        }
    }
}
