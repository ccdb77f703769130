//! Low-level access to the three remote API surfaces.
//!
//! The client is deliberately dumb: build query parameters, GET, decode
//! JSON, hand the body back as-is. Interpreting the payload is the
//! normalizers' job, and retries belong to callers.

use reqwest::StatusCode;
use serde_json::Value;

use crate::constants::SERVICES_HOST;
use crate::error::FetchError;

/// Query parameters as (name, value) pairs.
pub type Params<'a> = &'a [(&'a str, String)];

/// Issues requests against a single wiki's API surfaces.
///
/// Holds a clone of the process-wide [`reqwest::Client`]; cloning is cheap
/// and shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct EndpointClient {
    http: reqwest::Client,
    wiki_id: u64,
    base_url: String,
    services_host: String,
}

impl EndpointClient {
    #[must_use]
    pub fn new(http: reqwest::Client, wiki_id: u64, base_url: String) -> Self {
        Self {
            http,
            wiki_id,
            base_url,
            services_host: SERVICES_HOST.to_string(),
        }
    }

    /// Points the services calls at a different host.
    #[must_use]
    pub fn with_services_host(mut self, host: impl Into<String>) -> Self {
        self.services_host = host.into();
        self
    }

    #[must_use]
    pub fn wiki_id(&self) -> u64 {
        self.wiki_id
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base}/api.php` with the given parameters.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on network failure, non-success status, or a
    /// body that is not valid JSON.
    pub async fn call_api(&self, params: Params<'_>) -> Result<Value, FetchError> {
        let url = format!("{}/api.php", self.base_url);
        self.get_json("api.php", &url, params).await
    }

    /// GET `{services_host}/{service}/{wiki_id}/{path}` with the given
    /// parameters.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on network failure, non-success status, or a
    /// body that is not valid JSON.
    pub async fn call_service(
        &self,
        service: &str,
        path: &str,
        params: Params<'_>,
    ) -> Result<Value, FetchError> {
        let url = format!("{}/{service}/{}/{path}", self.services_host, self.wiki_id);
        self.get_json("services", &url, params).await
    }

    /// GET `{base}/wikia.php` with the given parameters.
    ///
    /// Always forces `format=json`, dropping any caller-supplied `format`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::MissingBaseUrl`] when the wiki has no base URL
    /// configured, otherwise as [`Self::call_api`].
    pub async fn call_nirvana(&self, params: Params<'_>) -> Result<Value, FetchError> {
        if self.base_url.is_empty() {
            return Err(FetchError::MissingBaseUrl);
        }

        let url = format!("{}/wikia.php", self.base_url);
        let mut params: Vec<(&str, String)> = params
            .iter()
            .filter(|(name, _)| *name != "format")
            .cloned()
            .collect();
        params.push(("format", "json".to_string()));

        self.get_json("wikia.php", &url, &params).await
    }

    async fn get_json(
        &self,
        endpoint: &'static str,
        url: &str,
        params: Params<'_>,
    ) -> Result<Value, FetchError> {
        let response = self.http.get(url).query(params).send().await?;

        // The RPC surface answers 204 for empty result sets.
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        if !response.status().is_success() {
            return Err(FetchError::Status {
                endpoint,
                status: response.status(),
            });
        }

        Ok(response.json().await?)
    }
}
