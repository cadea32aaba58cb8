//! Rendered email ready for delivery

use serde::{Deserialize, Serialize};

/// Subject plus HTML and plain-text bodies produced from one generation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedEmail {
    pub subject: String,
    pub html_body: String,
    /// The source markdown, sent as the `text/plain` alternative
    pub text_body: String,
}

impl RenderedEmail {
    pub fn new(
        subject: impl Into<String>,
        html_body: impl Into<String>,
        text_body: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            html_body: html_body.into(),
            text_body: text_body.into(),
        }
    }
}
