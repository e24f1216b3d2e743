use common::cache::{RequestParams, TtlCache};
use common::errors::AppError;
use common::http_client::{HttpClient, with_query};
use common::models::WeatherResponse;
use std::sync::Arc;
use tracing::{info, instrument, warn};

const GENERIC_FAILURE: &str = "Failed to fetch weather data. Please try again.";

/// WeatherAPI.com `forecast.json` client, fronted by the forecast cache.
pub struct WeatherApiClient {
    http_client: Arc<HttpClient>,
    cache: Arc<TtlCache<WeatherResponse>>,
    base_url: String,
    api_key: Option<String>,
}

impl WeatherApiClient {
    pub fn new(
        http_client: Arc<HttpClient>,
        cache: Arc<TtlCache<WeatherResponse>>,
        base_url: String,
        api_key: Option<String>,
    ) -> Self {
        Self {
            http_client,
            cache,
            base_url,
            api_key,
        }
    }

    /// Current conditions, location and `days` of forecast for `city`.
    ///
    /// `city` may also be a `"lat,lon"` pair; the provider accepts both.
    #[instrument(skip(self), fields(city = %city))]
    pub async fn get_weather(&self, city: &str, days: u8) -> Result<WeatherResponse, AppError> {
        let api_key = self
            .api_key
            .clone()
            .ok_or_else(|| AppError::config("Missing environment variable: WEATHER_API_KEY"))?;

        let params = RequestParams::new().with("city", city).with("days", days);
        let http_client = self.http_client.clone();
        let url = with_query(
            &self.base_url,
            &RequestParams::new()
                .with("key", api_key)
                .with("q", city)
                .with("days", days)
                .query_string(),
        );
        let city_name = city.to_string();

        self.cache
            .get_or_fetch("forecast", &params, move || async move {
                info!(city = %city_name, days, "Fetching weather from API");
                http_client
                    .get_json::<WeatherResponse>("weather-api", &url)
                    .await
                    .map_err(translate_upstream_error)
            })
            .await
    }
}

/// Keep the provider's own explanation when it sent one, otherwise use a generic reason.
fn translate_upstream_error(err: AppError) -> AppError {
    match err {
        AppError::UpstreamError(message) => {
            warn!(reason = %message, "Weather provider rejected request");
            AppError::upstream(message)
        }
        other => {
            warn!(error = %other, "Weather provider call failed");
            AppError::upstream(GENERIC_FAILURE)
        }
    }
}
