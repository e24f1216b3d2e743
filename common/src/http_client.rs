use crate::errors::AppError;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// HTTP client with a hard timeout. Failures are returned as-is, never retried.
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

/// Error bodies we know how to read a message out of.
#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorEnvelope {
    /// Provider style: `{ "error": { "code": 1006, "message": "..." } }`
    Provider { error: ProviderError },
    /// Gateway style: `{ "message": "..." }`
    Gateway { message: String },
}

#[derive(Deserialize)]
struct ProviderError {
    message: String,
}

impl HttpClient {
    pub fn new(timeout_secs: u64) -> Result<Self, AppError> {
        let timeout = Duration::from_secs(timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    /// Fetch JSON from URL.
    #[instrument(skip_all, fields(endpoint = %endpoint))]
    pub async fn get_json<T>(&self, endpoint: &str, url: &str) -> Result<T, AppError>
    where
        T: serde::de::DeserializeOwned,
    {
        self.get_json_with_headers(endpoint, url, &[]).await
    }

    /// Fetch JSON from URL, sending extra request headers.
    ///
    /// `endpoint` is only used for logging; the URL itself may carry credentials.
    #[instrument(skip_all, fields(endpoint = %endpoint))]
    pub async fn get_json_with_headers<T>(
        &self,
        endpoint: &str,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<T, AppError>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| AppError::timeout(format!("Request to {} timed out", endpoint)))?
            .map_err(AppError::from)?;

        let status = response.status();
        let text = response.text().await.map_err(AppError::from)?;

        if !status.is_success() {
            let err = error_from_body(status.as_u16(), &text);
            warn!(endpoint = %endpoint, status = status.as_u16(), error = %err, "Request failed");
            return Err(err);
        }

        debug!(endpoint = %endpoint, "Request successful");
        let json: T = serde_json::from_str(&text)?;

        Ok(json)
    }
}

/// Turn a non-2xx body into the most specific error we can.
pub fn error_from_body(status: u16, body: &str) -> AppError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope::Provider { error }) => AppError::upstream(error.message),
        Ok(ErrorEnvelope::Gateway { message }) => AppError::http(status, message),
        Err(_) => AppError::http(status, format!("HTTP error: {}", status)),
    }
}

/// Build `base?query`, keeping any query string `base` already has.
pub fn with_query(base: &str, query: &str) -> String {
    if query.is_empty() {
        base.to_string()
    } else if base.contains('?') {
        format!("{}&{}", base, query)
    } else {
        format!("{}?{}", base, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    #[test]
    fn provider_envelope_becomes_upstream_error() {
        let body = r#"{"error":{"code":1006,"message":"No matching location found."}}"#;
        match error_from_body(400, body) {
            AppError::UpstreamError(message) => assert_eq!(message, "No matching location found."),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn gateway_envelope_keeps_status() {
        match error_from_body(400, r#"{"message":"City parameter is required"}"#) {
            AppError::HttpError { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "City parameter is required");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_body_falls_back_to_status() {
        match error_from_body(502, "Bad Gateway") {
            AppError::HttpError { status, message } => {
                assert_eq!(status, 502);
                assert!(message.contains("502"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn with_query_appends_correctly() {
        assert_eq!(with_query("http://x/api", ""), "http://x/api");
        assert_eq!(with_query("http://x/api", "a=1"), "http://x/api?a=1");
        assert_eq!(with_query("http://x/api?k=v", "a=1"), "http://x/api?k=v&a=1");
    }

    #[tokio::test]
    async fn sends_headers_and_decodes_json() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/cities"))
            .and(header("X-RapidAPI-Key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(2).expect("client");
        let body: serde_json::Value = client
            .get_json_with_headers(
                "cities",
                &format!("{}/cities", mock_server.uri()),
                &[("X-RapidAPI-Key", "secret")],
            )
            .await
            .expect("request should succeed");

        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn does_not_retry_failures() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/error"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(2).expect("client");
        let result: Result<serde_json::Value, _> = client
            .get_json("error", &format!("{}/error", mock_server.uri()))
            .await;

        assert!(matches!(result, Err(AppError::HttpError { status: 500, .. })));
    }

    #[tokio::test]
    async fn slow_responses_time_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(1).expect("client");
        let result: Result<serde_json::Value, _> = client
            .get_json("slow", &format!("{}/slow", mock_server.uri()))
            .await;

        assert!(matches!(result, Err(AppError::TimeoutError(_))));
    }
}
