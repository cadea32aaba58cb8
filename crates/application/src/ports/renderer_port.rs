//! Renderer port - markdown to email

use domain::RenderedEmail;
#[cfg(test)]
use mockall::automock;

use crate::error::RenderError;

/// Turns a generated markdown document into a deliverable email
///
/// Implementations are pure: no I/O, and malformed markdown is sanitized
/// rather than rejected.
#[cfg_attr(test, automock)]
pub trait RendererPort: Send + Sync {
    fn render(&self, markdown: &str) -> Result<RenderedEmail, RenderError>;
}
