//! Markdown to XHTML fragment renderer for xserve.
//!
//! [`Renderer`] turns raw document bytes into a well-formed fragment ready to
//! be placed into a page template. The extension set is fixed:
//!
//! - tables, strikethrough and task lists
//! - bare `http(s)://` and `www.` URLs become links
//! - every newline inside a paragraph is a hard break
//! - headings get unique `id` anchors
//!
//! Raw HTML in the source is dropped, and dangerous URL schemes are blanked,
//! so the output can be inserted into a page without further escaping.
//!
//! # Architecture
//!
//! [`MarkdownRenderer`] walks `pulldown-cmark` events and delegates
//! flavour-specific markup to a [`RenderBackend`]. [`XhtmlBackend`] is the
//! backend used for generated sites.
//!
//! # Example
//!
//! ```
//! use xserve_renderer::{MarkdownRenderer, XhtmlBackend};
//!
//! let html = MarkdownRenderer::<XhtmlBackend>::new().render_markdown("a\nb");
//! assert_eq!(html, "<p>a<br />\nb</p>");
//! ```

mod autolink;
mod backend;
mod render;
mod renderer;
mod state;
mod text;
mod util;
mod xhtml;

pub use backend::RenderBackend;
pub use render::{RenderError, Renderer};
pub use renderer::MarkdownRenderer;
pub use text::{escape_html, slugify};
pub use util::{MARKUP_SUFFIX, PAGE_SUFFIX, page_file_name, strip_markup_suffix};
pub use xhtml::XhtmlBackend;
