//! Web search adapter - Implements WebSearchPort using integration_websearch

use application::error::ApplicationError;
use application::ports::WebSearchPort;
use async_trait::async_trait;
use domain::SearchHit;
use integration_websearch::{
    BraveSearchClient, SearchProvider, SearchResult, WebSearchConfig, WebSearchError,
};
use tracing::{debug, instrument};

/// Search backed by the Brave Search API
#[derive(Debug)]
pub struct BraveSearchAdapter {
    client: BraveSearchClient,
}

impl BraveSearchAdapter {
    /// # Errors
    ///
    /// Returns an error if the API key is missing or the HTTP client fails to
    /// initialize.
    pub fn new(config: &WebSearchConfig) -> Result<Self, ApplicationError> {
        let client = BraveSearchClient::new(config).map_err(Self::map_error)?;
        Ok(Self { client })
    }

    /// Map integration web search error to application error
    fn map_error(err: WebSearchError) -> ApplicationError {
        match err {
            WebSearchError::Throttled { retry_after_secs } => {
                debug!(retry_after = ?retry_after_secs, "Web search rate limited");
                ApplicationError::RateLimited
            },
            WebSearchError::TimedOut(secs) => {
                ApplicationError::Timeout(format!("search did not answer within {secs}s"))
            },
            e @ WebSearchError::Unauthorized(_) => ApplicationError::NotAuthorized(e.to_string()),
            e @ (WebSearchError::MissingApiKey | WebSearchError::InvalidSettings(_)) => {
                ApplicationError::Configuration(e.to_string())
            },
            e @ (WebSearchError::EmptyQuery | WebSearchError::Refused { .. }) => {
                ApplicationError::Rejected(e.to_string())
            },
            WebSearchError::MalformedBody(e) => ApplicationError::InvalidResponse(e),
            e @ (WebSearchError::Unavailable { .. }
            | WebSearchError::Unreachable(_)
            | WebSearchError::Transport(_)) => ApplicationError::ExternalService(e.to_string()),
        }
    }

    fn map_result(result: SearchResult) -> SearchHit {
        SearchHit::new(result.title, result.url, result.snippet)
    }
}

#[async_trait]
impl WebSearchPort for BraveSearchAdapter {
    #[instrument(skip(self), fields(query_len = query.len()))]
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, ApplicationError> {
        let response = self
            .client
            .search(query, max_results)
            .await
            .map_err(Self::map_error)?;

        debug!(
            results = response.results.len(),
            provider = %response.provider,
            "Retrieved search results"
        );
        Ok(response.results.into_iter().map(Self::map_result).collect())
    }
}

/// Stand-in for runs with a zero search budget, where no search is ever issued
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSearchAdapter;

#[async_trait]
impl WebSearchPort for DisabledSearchAdapter {
    async fn search(
        &self,
        _query: &str,
        _max_results: usize,
    ) -> Result<Vec<SearchHit>, ApplicationError> {
        Err(ApplicationError::Configuration(
            "web search is not configured for this run".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_configuration_error() {
        let err = BraveSearchAdapter::new(&WebSearchConfig::default()).unwrap_err();
        assert!(matches!(err, ApplicationError::Configuration(_)));
    }

    #[test]
    fn errors_map_to_port_errors() {
        assert!(matches!(
            BraveSearchAdapter::map_error(WebSearchError::Throttled {
                retry_after_secs: Some(2)
            }),
            ApplicationError::RateLimited
        ));
        assert!(matches!(
            BraveSearchAdapter::map_error(WebSearchError::Unauthorized(401)),
            ApplicationError::NotAuthorized(_)
        ));
        assert!(
            BraveSearchAdapter::map_error(WebSearchError::TimedOut(15))
                .is_retryable()
        );
    }

    #[test]
    fn result_maps_to_hit() {
        let hit = BraveSearchAdapter::map_result(SearchResult::new(
            "dbt 1.9".into(),
            "https://www.getdbt.com/blog/1-9".into(),
            "Microbatch models".into(),
            1,
        ));
        assert_eq!(hit.title, "dbt 1.9");
        assert_eq!(hit.url, "https://www.getdbt.com/blog/1-9");
        assert_eq!(hit.excerpt, "Microbatch models");
    }

    #[tokio::test]
    async fn disabled_search_refuses() {
        assert!(DisabledSearchAdapter.search("anything", 5).await.is_err());
    }
}
