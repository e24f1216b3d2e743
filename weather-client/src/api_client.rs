use common::cache::RequestParams;
use common::errors::AppError;
use common::http_client::{HttpClient, with_query};
use serde::de::DeserializeOwned;

/// Thin client for the local weather gateway (`/api/*`).
pub struct GatewayClient {
    http_client: HttpClient,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, AppError> {
        Ok(Self {
            http_client: HttpClient::new(timeout_secs)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// `GET {base}/{path}?{params}`. Non-2xx responses carry the gateway's `message`.
    pub async fn get<T>(&self, path: &str, params: &RequestParams) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        let url = with_query(
            &format!("{}/{}", self.base_url, path),
            &params.query_string(),
        );
        self.http_client.get_json(path, &url).await
    }
}
