//! Web search port
//!
//! Executes the model's search requests against a web-search provider.

use async_trait::async_trait;
use domain::SearchHit;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for web search operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WebSearchPort: Send + Sync {
    /// Search and return at most `max_results` snippets in rank order
    ///
    /// An empty list is a valid answer.
    async fn search(&self, query: &str, max_results: usize)
    -> Result<Vec<SearchHit>, ApplicationError>;
}
