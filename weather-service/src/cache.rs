use common::cache::{SweepHandle, TtlCache};
use common::models::{CitySuggestion, WeatherResponse};
use std::sync::Arc;
use tokio::time::Duration;
use tracing::info;

/// Process-wide caches for the gateway, built once at startup.
///
/// City search results outlive weather payloads by a wide margin since geography
/// changes far less often than weather.
pub struct ServerCaches {
    pub search: Arc<TtlCache<Vec<CitySuggestion>>>,
    pub forecast: Arc<TtlCache<WeatherResponse>>,
    sweepers: Vec<SweepHandle>,
}

impl ServerCaches {
    pub fn new(search_ttl_seconds: u64, weather_ttl_seconds: u64) -> Self {
        Self {
            search: Arc::new(TtlCache::with_ttl(
                "search",
                Duration::from_secs(search_ttl_seconds),
            )),
            forecast: Arc::new(TtlCache::with_ttl(
                "forecast",
                Duration::from_secs(weather_ttl_seconds),
            )),
            sweepers: Vec::new(),
        }
    }

    pub fn start_sweeping(&mut self, every_seconds: u64) {
        let every = Duration::from_secs(every_seconds.max(1));
        self.sweepers.push(self.search.spawn_sweeper(every));
        self.sweepers.push(self.forecast.spawn_sweeper(every));
        info!(interval_secs = every.as_secs(), "Cache sweepers started");
    }

    pub async fn shutdown(&mut self) {
        for sweeper in self.sweepers.drain(..) {
            sweeper.stop().await;
        }
        info!("Cache sweepers stopped");
    }
}
