use async_trait::async_trait;

use crate::{WebSearchError, WebSearchResponse};

/// A backend that answers free-text queries with ranked results
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run `query`, returning at most `max_results` hits
    ///
    /// # Errors
    ///
    /// Fails on an empty query or when the backend cannot be queried. No
    /// matches is an empty `results` list, not an error.
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<WebSearchResponse, WebSearchError>;
}
