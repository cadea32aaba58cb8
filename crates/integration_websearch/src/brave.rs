//! Brave Search web endpoint (<https://brave.com/search/api/>)

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::RETRY_AFTER;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument, warn};

use crate::{
    WebSearchResponse, config::WebSearchConfig, error::WebSearchError, models::SearchResult,
    provider::SearchProvider,
};

/// Brave API hard limit on `count`
const BRAVE_MAX_COUNT: usize = 20;

mod api {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct BraveSearchResponse {
        pub web: Option<WebResults>,
    }

    #[derive(Debug, Deserialize)]
    pub struct WebResults {
        #[serde(default)]
        pub results: Vec<WebResult>,
    }

    #[derive(Debug, Deserialize)]
    pub struct WebResult {
        pub title: String,
        pub url: String,
        pub description: Option<String>,
        pub age: Option<String>,
    }
}

/// Brave Search API client
#[derive(Debug)]
pub struct BraveSearchClient {
    client: Client,
    api_key: SecretString,
    base_url: String,
    timeout_secs: u64,
    max_results: usize,
    freshness: Option<String>,
    safe_search: String,
    result_country: String,
    result_language: String,
}

impl BraveSearchClient {
    /// # Errors
    ///
    /// Fails when the API key is blank, the settings are out of range or the
    /// HTTP client cannot be built.
    pub fn new(config: &WebSearchConfig) -> Result<Self, WebSearchError> {
        let api_key = config
            .brave_api_key
            .as_ref()
            .filter(|key| !key.expose_secret().trim().is_empty())
            .map(|key| SecretString::from(key.expose_secret().trim().to_owned()))
            .ok_or(WebSearchError::MissingApiKey)?;
        config.validate().map_err(WebSearchError::InvalidSettings)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WebSearchError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.brave_base_url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
            max_results: config.max_results,
            freshness: config.freshness.clone(),
            safe_search: config.safe_search.clone(),
            result_country: config.result_country.clone(),
            result_language: config.result_language.clone(),
        })
    }

    fn query_params(&self, query: &str, count: usize) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", query.to_string()),
            ("count", count.to_string()),
            ("safesearch", self.safe_search.clone()),
            ("country", self.result_country.to_lowercase()),
            ("search_lang", self.result_language.clone()),
            ("text_decorations", "false".to_string()),
        ];
        if let Some(freshness) = &self.freshness {
            params.push(("freshness", freshness.clone()));
        }
        params
    }

    fn convert_results(response: api::BraveSearchResponse, limit: usize) -> Vec<SearchResult> {
        let Some(web) = response.web else {
            return Vec::new();
        };
        (1u32..)
            .zip(web.results.into_iter().take(limit))
            .map(|(position, r)| {
                SearchResult::new(
                    strip_markup(&r.title),
                    r.url,
                    strip_markup(r.description.as_deref().unwrap_or_default()),
                    position,
                )
                .with_age(r.age)
            })
            .collect()
    }
}

/// Drop inline HTML tags and decode the few entities Brave emits
fn strip_markup(text: &str) -> String {
    let mut plain = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => plain.push(c),
            _ => {},
        }
    }
    plain
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

#[async_trait]
impl SearchProvider for BraveSearchClient {
    #[instrument(skip(self), fields(provider = "brave"))]
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<WebSearchResponse, WebSearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(WebSearchError::EmptyQuery);
        }

        let count = max_results.clamp(1, self.max_results.min(BRAVE_MAX_COUNT));
        let started = Instant::now();
        debug!(count, freshness = ?self.freshness, "Sending Brave Search request");

        let response = self
            .client
            .get(format!("{}/web/search", self.base_url))
            .query(&self.query_params(query, count))
            .header("X-Subscription-Token", self.api_key.expose_secret())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| WebSearchError::from_transport(&e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.trim().parse().ok());
            let body = response.text().await.unwrap_or_default();
            let err = WebSearchError::from_status(status, retry_after, &body);
            warn!(status = %status, error = %err, "Brave Search request failed");
            return Err(err);
        }

        let body = response
            .text()
            .await
            .map_err(|e| WebSearchError::from_transport(&e, self.timeout_secs))?;
        let parsed: api::BraveSearchResponse = serde_json::from_str(&body)
            .map_err(|e| WebSearchError::MalformedBody(e.to_string()))?;

        let results = Self::convert_results(parsed, count);
        debug!(
            results = results.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Brave Search completed"
        );

        Ok(WebSearchResponse::new(query, results, "brave"))
    }
}
