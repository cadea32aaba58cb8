//! Web search domain entities

use serde::{Deserialize, Serialize};

/// Longest excerpt passed back to the model
const MAX_EXCERPT_CHARS: usize = 300;

/// A single search result snippet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    /// Short description of the page content
    pub excerpt: String,
}

impl SearchHit {
    pub fn new(title: impl Into<String>, url: impl Into<String>, excerpt: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            excerpt: excerpt.into(),
        }
    }

    /// Excerpt cut on a character boundary with a trailing ellipsis
    pub fn truncated_excerpt(&self) -> String {
        if self.excerpt.chars().count() <= MAX_EXCERPT_CHARS {
            return self.excerpt.clone();
        }
        let cut: String = self.excerpt.chars().take(MAX_EXCERPT_CHARS - 3).collect();
        format!("{cut}...")
    }

    /// Returns a string like: "\[1\] Title (https://...): excerpt"
    pub fn format_citation(&self, position: usize) -> String {
        format!(
            "[{position}] {} ({}): {}",
            self.title,
            self.url,
            self.truncated_excerpt()
        )
    }
}

/// Render search hits as the text content of a tool result
pub fn format_hits_for_model(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No web search results found for: {query}");
    }

    let mut output = format!(
        "Web search results for \"{query}\" ({} results):\n\n",
        hits.len()
    );
    for (index, hit) in hits.iter().enumerate() {
        output.push_str(&hit.format_citation(index + 1));
        output.push_str("\n\n");
    }
    output.trim_end().to_string()
}
