//! Journey search transport.
//!
//! [`JourneySearch`] is the seam the planner searches through; [`TflClient`]
//! implements it against the TfL Unified API.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use wayfarer_core::error::SearchError;

use crate::params::JourneySearchParams;

const JOURNEY_ENDPOINT: [&str; 2] = ["Journey", "JourneyResults"];

/// Raw outcome of one search: HTTP-like status plus JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    /// 200 = resolved, 300 = ambiguous; anything else is unexpected
    pub status: u16,
    pub payload: Value,
}

#[async_trait]
pub trait JourneySearch: Send + Sync {
    async fn search(
        &self,
        from: &str,
        to: &str,
        params: &JourneySearchParams,
    ) -> Result<SearchResponse, SearchError>;
}

/// TfL Unified API client.
pub struct TflClient {
    base_url: reqwest::Url,
    app_key: Option<String>,
    client: reqwest::Client,
}

impl TflClient {
    pub fn new(base_url: &str, app_key: Option<String>) -> Result<Self, SearchError> {
        let base_url = reqwest::Url::parse(base_url)
            .map_err(|e| SearchError::Transport(format!("invalid base URL '{base_url}': {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| SearchError::Transport(format!("HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            app_key,
            client,
        })
    }

    pub fn from_config(config: &wayfarer_config::SearchConfig) -> Result<Self, SearchError> {
        Self::new(&config.base_url, config.app_key.clone())
    }

    /// `{base}/Journey/JourneyResults/{from}/to/{to}`, segments percent-encoded.
    fn journey_url(&self, from: &str, to: &str) -> Result<reqwest::Url, SearchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SearchError::Transport(format!("base URL cannot take a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(JOURNEY_ENDPOINT)
            .extend([from, "to", to]);
        Ok(url)
    }
}

#[async_trait]
impl JourneySearch for TflClient {
    async fn search(
        &self,
        from: &str,
        to: &str,
        params: &JourneySearchParams,
    ) -> Result<SearchResponse, SearchError> {
        let url = self.journey_url(from, to)?;
        let mut query = params.to_query();
        if let Some(key) = &self.app_key {
            query.push(("app_key".into(), key.clone()));
        }

        debug!(%from, %to, params = query.len(), "Searching journeys");

        let response = self
            .client
            .get(url)
            .query(&query)
            .send()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?;
        let payload = serde_json::from_str(&body).unwrap_or(Value::String(body));

        Ok(SearchResponse { status, payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_journey_url() {
        let client = TflClient::new("https://api.tfl.gov.uk/", None).unwrap();
        let url = client.journey_url("1000013", "51.5,-0.12").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.tfl.gov.uk/Journey/JourneyResults/1000013/to/51.5,-0.12"
        );
    }

    #[test]
    fn encodes_location_names() {
        let client = TflClient::new("https://api.tfl.gov.uk", None).unwrap();
        let url = client.journey_url("King's Cross", "Angel").unwrap();
        assert!(url.as_str().contains("/JourneyResults/King's%20Cross/to/Angel"));
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(matches!(
            TflClient::new("not a url", None),
            Err(SearchError::Transport(_))
        ));
    }

    #[test]
    fn from_config_uses_search_base_url() {
        let config = wayfarer_config::SearchConfig::default();
        let client = TflClient::from_config(&config).unwrap();
        assert_eq!(client.base_url.as_str(), "https://api.tfl.gov.uk/");
    }
}
