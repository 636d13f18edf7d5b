//! Byte-level entry point shared by all build workers.

use std::panic::{self, AssertUnwindSafe};
use std::str::Utf8Error;

use crate::renderer::MarkdownRenderer;
use crate::xhtml::XhtmlBackend;

/// Error returned when a document cannot be converted.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Document bytes are not valid UTF-8.
    #[error("document is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] Utf8Error),
    /// The renderer failed internally on this input.
    #[error("renderer failed: {0}")]
    Internal(String),
}

/// Markdown to XHTML fragment renderer.
///
/// Holds only immutable options, so one instance can be shared by reference
/// across threads; every call renders with fresh per-document state.
///
/// # Example
///
/// ```
/// use xserve_renderer::Renderer;
///
/// let renderer = Renderer::new();
/// let html = renderer.render(b"# Hi").unwrap();
/// assert_eq!(html, r#"<h1 id="hi">Hi</h1>"#);
/// ```
#[derive(Clone, Debug)]
pub struct Renderer {
    autolink: bool,
}

impl Renderer {
    /// Create a renderer with the full extension set enabled.
    #[must_use]
    pub fn new() -> Self {
        Self { autolink: true }
    }

    /// Enable or disable linking of bare URLs.
    #[must_use]
    pub fn with_autolink(mut self, enabled: bool) -> Self {
        self.autolink = enabled;
        self
    }

    /// Render raw document bytes to an XHTML fragment.
    ///
    /// Never panics: invalid UTF-8 and internal renderer failures are both
    /// reported as [`RenderError`].
    pub fn render(&self, content: &[u8]) -> Result<String, RenderError> {
        let markdown = std::str::from_utf8(content)?;
        self.render_str(markdown)
    }

    /// Render markdown text to an XHTML fragment.
    pub fn render_str(&self, markdown: &str) -> Result<String, RenderError> {
        panic::catch_unwind(AssertUnwindSafe(|| {
            MarkdownRenderer::<XhtmlBackend>::new()
                .with_autolink(self.autolink)
                .render_markdown(markdown)
        }))
        .map_err(|payload| RenderError::Internal(panic_message(payload.as_ref())))
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_owned()
    }
}
