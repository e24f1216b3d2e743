use common::cache::{RequestParams, TtlCache};
use common::errors::AppError;
use common::http_client::{HttpClient, with_query};
use common::models::CitySuggestion;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Queries shorter than this never reach the provider.
pub const MIN_QUERY_LEN: usize = 3;

const RESULT_LIMIT: u32 = 10;

#[derive(Debug, Deserialize)]
struct GeoDbResponse {
    #[serde(default)]
    data: Vec<GeoDbCity>,
}

#[derive(Debug, Deserialize)]
struct GeoDbCity {
    id: i64,
    name: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    country: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    population: i64,
    #[serde(rename = "type", default)]
    kind: String,
}

/// GeoDB Cities (RapidAPI) client, fronted by the long-lived search cache.
pub struct GeoDbClient {
    http_client: Arc<HttpClient>,
    cache: Arc<TtlCache<Vec<CitySuggestion>>>,
    base_url: String,
    api_key: Option<String>,
    api_host: String,
}

impl GeoDbClient {
    pub fn new(
        http_client: Arc<HttpClient>,
        cache: Arc<TtlCache<Vec<CitySuggestion>>>,
        base_url: String,
        api_key: Option<String>,
        api_host: String,
    ) -> Self {
        Self {
            http_client,
            cache,
            base_url,
            api_key,
            api_host,
        }
    }

    /// City suggestions for a name prefix.
    ///
    /// Provider failures degrade to an empty list so search-as-you-type shows "no results";
    /// only a missing API key is reported as an error.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search_cities(&self, query: &str) -> Result<Vec<CitySuggestion>, AppError> {
        let api_key = self
            .api_key
            .clone()
            .ok_or_else(|| AppError::config("Missing environment variable: RAPID_API_KEY"))?;

        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        let params = RequestParams::new().with("q", query);
        let http_client = self.http_client.clone();
        let api_host = self.api_host.clone();
        let url = with_query(
            &self.base_url,
            &RequestParams::new()
                .with("namePrefix", query)
                .with("limit", RESULT_LIMIT)
                .with("sort", "-population")
                .with("languageCode", "en")
                .with("types", "CITY")
                .query_string(),
        );
        let query_owned = query.to_string();

        let result = self
            .cache
            .get_or_fetch("search", &params, move || async move {
                info!(query = %query_owned, "Searching cities");
                let response: GeoDbResponse = http_client
                    .get_json_with_headers(
                        "geodb",
                        &url,
                        &[
                            ("X-RapidAPI-Key", api_key.as_str()),
                            ("X-RapidAPI-Host", api_host.as_str()),
                        ],
                    )
                    .await?;
                Ok::<_, AppError>(to_suggestions(response.data))
            })
            .await;

        match result {
            Ok(suggestions) => Ok(suggestions),
            Err(e) => {
                warn!(error = %e, "City search failed, returning no results");
                Ok(Vec::new())
            }
        }
    }
}

/// Keep populated places of type CITY; drops divisions and regions sharing the name.
fn to_suggestions(cities: Vec<GeoDbCity>) -> Vec<CitySuggestion> {
    cities
        .into_iter()
        .filter(|city| city.kind == "CITY" && city.population > 0)
        .map(|city| CitySuggestion {
            label: format!("{}, {}, {}", city.name, city.region, city.country),
            id: city.id,
            name: city.name,
            region: city.region,
            country: city.country,
            lat: city.latitude,
            lon: city.longitude,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: i64, name: &str, kind: &str, population: i64) -> GeoDbCity {
        GeoDbCity {
            id,
            name: name.to_string(),
            region: "Maharashtra".to_string(),
            country: "India".to_string(),
            latitude: 18.52,
            longitude: 73.85,
            population,
            kind: kind.to_string(),
        }
    }

    #[test]
    fn filters_non_cities_and_empty_places() {
        let suggestions = to_suggestions(vec![
            raw(1, "Pune", "CITY", 3_124_458),
            raw(2, "Pune Division", "ADM2", 10_000_000),
            raw(3, "Pune Village", "CITY", 0),
        ]);

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].id, 1);
        assert_eq!(suggestions[0].label, "Pune, Maharashtra, India");
        assert_eq!(suggestions[0].lat, 18.52);
        assert_eq!(suggestions[0].lon, 73.85);
    }

    #[tokio::test]
    async fn short_queries_return_nothing() {
        let client = GeoDbClient::new(
            Arc::new(HttpClient::new(1).expect("client")),
            Arc::new(TtlCache::with_ttl("search", tokio::time::Duration::from_secs(60))),
            "http://127.0.0.1:9/cities".to_string(),
            Some("key".to_string()),
            "host".to_string(),
        );

        assert!(client.search_cities("Pu").await.unwrap().is_empty());
        assert!(client.search_cities("  Pu  ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_key_is_an_error() {
        let client = GeoDbClient::new(
            Arc::new(HttpClient::new(1).expect("client")),
            Arc::new(TtlCache::with_ttl("search", tokio::time::Duration::from_secs(60))),
            "http://127.0.0.1:9/cities".to_string(),
            None,
            "host".to_string(),
        );

        assert!(matches!(
            client.search_cities("Pune").await,
            Err(AppError::ConfigError(_))
        ));
    }
}
