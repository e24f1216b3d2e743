use common::cache::{SweepHandle, TtlCache};
use common::models::{CitySuggestion, DailyForecast, HourlyForecast, WeatherResponse};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Duration;
use tracing::debug;

/// One cache per logical endpoint, all sharing the same freshness window.
pub struct ClientCaches {
    pub search: Arc<TtlCache<Vec<CitySuggestion>>>,
    pub weather: Arc<TtlCache<WeatherResponse>>,
    pub forecast: Arc<TtlCache<Vec<DailyForecast>>>,
    pub hourly: Arc<TtlCache<Vec<HourlyForecast>>>,
    sweepers: Mutex<Vec<SweepHandle>>,
}

impl ClientCaches {
    pub fn with_ttl(ttl_seconds: u64) -> Self {
        let ttl = Duration::from_secs(ttl_seconds);
        Self {
            search: Arc::new(TtlCache::with_ttl("search", ttl)),
            weather: Arc::new(TtlCache::with_ttl("weather", ttl)),
            forecast: Arc::new(TtlCache::with_ttl("forecast", ttl)),
            hourly: Arc::new(TtlCache::with_ttl("hourly", ttl)),
            sweepers: Mutex::new(Vec::new()),
        }
    }

    pub async fn start_sweeping(&self, every_seconds: u64) {
        let every = Duration::from_secs(every_seconds.max(1));
        let mut sweepers = self.sweepers.lock().await;
        sweepers.push(self.search.spawn_sweeper(every));
        sweepers.push(self.weather.spawn_sweeper(every));
        sweepers.push(self.forecast.spawn_sweeper(every));
        sweepers.push(self.hourly.spawn_sweeper(every));
        debug!(interval_secs = every.as_secs(), "Client cache sweepers started");
    }

    pub async fn stop_sweeping(&self) {
        let sweepers: Vec<SweepHandle> = self.sweepers.lock().await.drain(..).collect();
        for sweeper in sweepers {
            sweeper.stop().await;
        }
    }

    pub async fn clear(&self) {
        self.search.clear().await;
        self.weather.clear().await;
        self.forecast.clear().await;
        self.hourly.clear().await;
    }
}
