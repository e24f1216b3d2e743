use common::cache::{RequestParams, TtlCache};
use common::errors::AppError;
use common::models::{CitySuggestion, DailyForecast, HourlyForecast, WeatherResponse};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::api_client::GatewayClient;
use crate::cache::ClientCaches;
use crate::config::ClientConfig;

/// Searches shorter than this are answered locally with no results.
pub const MIN_SEARCH_LEN: usize = 3;

/// The hourly chart always covers the next day.
pub const HOURLY_DAYS: u8 = 1;

/// Everything the dashboard shows for one location, loaded as a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSnapshot {
    pub weather: WeatherResponse,
    pub forecast: Vec<DailyForecast>,
    pub hourly: Vec<HourlyForecast>,
}

/// Cache-first access to the gateway's four endpoints.
pub struct WeatherService {
    gateway: Arc<GatewayClient>,
    caches: ClientCaches,
}

impl WeatherService {
    pub fn new(gateway: GatewayClient, caches: ClientCaches) -> Self {
        Self {
            gateway: Arc::new(gateway),
            caches,
        }
    }

    /// Service wired from config, with cache sweeping already running.
    pub async fn from_config(config: &ClientConfig) -> Result<Self, AppError> {
        let gateway = GatewayClient::new(config.server_url.clone(), config.timeout_seconds)?;
        let caches = ClientCaches::with_ttl(config.cache_ttl_seconds);
        caches.start_sweeping(config.cache_sweep_seconds).await;
        Ok(Self::new(gateway, caches))
    }

    pub fn caches(&self) -> &ClientCaches {
        &self.caches
    }

    #[instrument(skip(self))]
    pub async fn search_cities(&self, query: &str) -> Result<Vec<CitySuggestion>, AppError> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_LEN {
            debug!(query, "Query too short, skipping search");
            return Ok(Vec::new());
        }

        let params = RequestParams::new().with("q", query);
        self.cached(&self.caches.search, "search", "search", params)
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_current_weather(&self, city: &str) -> Result<WeatherResponse, AppError> {
        let params = RequestParams::new().with("city", city);
        self.cached(&self.caches.weather, "weather", "weather", params)
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_forecast(&self, city: &str, days: u8) -> Result<Vec<DailyForecast>, AppError> {
        let params = RequestParams::new().with("city", city).with("days", days);
        self.cached(&self.caches.forecast, "forecast", "daily_forecast", params)
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_hourly_forecast(
        &self,
        city: &str,
        days: u8,
    ) -> Result<Vec<HourlyForecast>, AppError> {
        let params = RequestParams::new().with("city", city).with("days", days);
        self.cached(&self.caches.hourly, "hourly", "hourly_forecast", params)
            .await
    }

    /// Current weather, `days` of daily forecast and the hourly chart, fetched together.
    ///
    /// Fails as a whole on the first failing call; no partial snapshot is produced.
    #[instrument(skip(self))]
    pub async fn load_location(&self, query: &str, days: u8) -> Result<LocationSnapshot, AppError> {
        let (weather, forecast, hourly) = tokio::try_join!(
            self.get_current_weather(query),
            self.get_forecast(query, days),
            self.get_hourly_forecast(query, HOURLY_DAYS),
        )?;

        Ok(LocationSnapshot {
            weather,
            forecast,
            hourly,
        })
    }

    pub async fn clear_cache(&self) {
        self.caches.clear().await;
    }

    async fn cached<V>(
        &self,
        cache: &Arc<TtlCache<V>>,
        endpoint: &'static str,
        path: &'static str,
        params: RequestParams,
    ) -> Result<V, AppError>
    where
        V: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        let gateway = self.gateway.clone();
        let request = params.clone();
        cache
            .get_or_fetch(endpoint, &params, move || async move {
                gateway.get::<V>(path, &request).await
            })
            .await
    }
}
