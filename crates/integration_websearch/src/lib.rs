#![forbid(unsafe_code)]
//! Web search integration for the weekly brief
//!
//! Executes the model's `web_search` tool calls against the Brave Search API,
//! restricted to recent results. Results carry title, URL and a plain-text
//! excerpt so they can be cited in the generated newsletter.
//!
//! ```rust,ignore
//! use integration_websearch::{BraveSearchClient, SearchProvider, WebSearchConfig};
//!
//! let client = BraveSearchClient::new(&config)?;
//! for hit in client.search("Databricks announcements", 5).await?.results {
//!     println!("{} ({}) {}", hit.title, hit.source, hit.url);
//! }
//! ```

mod brave;
mod config;
mod error;
mod models;
mod provider;

pub use brave::BraveSearchClient;
pub use config::WebSearchConfig;
pub use error::WebSearchError;
pub use models::{SearchResult, WebSearchResponse};
pub use provider::SearchProvider;
