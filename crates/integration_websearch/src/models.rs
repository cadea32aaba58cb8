//! Normalized search results

use serde::{Deserialize, Serialize};

/// One hit, stripped of provider markup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    /// Plain-text excerpt
    pub snippet: String,
    /// Host of `url` without a leading `www.`, e.g. "databricks.com"
    pub source: String,
    /// 1-based rank within the response
    pub position: u32,
    /// Relative age label such as "3 days ago"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
}

impl SearchResult {
    #[must_use]
    pub fn new(title: String, url: String, snippet: String, position: u32) -> Self {
        let source = host_of(&url).unwrap_or_else(|| "unknown".to_string());
        Self {
            title,
            url,
            snippet,
            source,
            position,
            age: None,
        }
    }

    #[must_use]
    pub fn with_age(mut self, age: Option<String>) -> Self {
        self.age = age.filter(|a| !a.trim().is_empty());
        self
    }
}

fn host_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

/// Results for one query from one provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
    /// e.g. "brave"
    pub provider: String,
}

impl WebSearchResponse {
    #[must_use]
    pub fn new(query: impl Into<String>, results: Vec<SearchResult>, provider: &str) -> Self {
        Self {
            query: query.into(),
            results,
            provider: provider.to_string(),
        }
    }
}
