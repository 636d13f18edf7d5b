//! Render backend trait for format-specific rendering.
//!
//! The generic renderer handles block structure, inline formatting and
//! headings. Elements whose markup differs between output flavours (void
//! elements, code blocks, link targets) go through this trait.

use std::borrow::Cow;

/// Backend trait for format-specific rendering operations.
pub trait RenderBackend {
    /// Render a fenced or indented code block. `content` is unescaped.
    fn code_block(lang: Option<&str>, content: &str, out: &mut String);

    /// Render blockquote start tag.
    fn blockquote_start(out: &mut String) {
        out.push_str("<blockquote>");
    }

    /// Render blockquote end tag.
    fn blockquote_end(out: &mut String) {
        out.push_str("</blockquote>");
    }

    /// Render an image. `src` has already passed [`RenderBackend::transform_url`].
    fn image(src: &str, alt: &str, title: &str, out: &mut String);

    /// Transform a link or image URL before it is written.
    ///
    /// Default implementation returns the URL unchanged.
    #[must_use]
    fn transform_url(url: &str) -> Cow<'_, str> {
        Cow::Borrowed(url)
    }

    /// Render a hard break.
    fn hard_break(out: &mut String) {
        out.push_str("<br>");
    }

    /// Render a soft break (a single newline inside a paragraph).
    fn soft_break(out: &mut String) {
        out.push('\n');
    }

    /// Render a horizontal rule.
    fn horizontal_rule(out: &mut String) {
        out.push_str("<hr>");
    }

    /// Render a task list marker.
    fn task_list_marker(checked: bool, out: &mut String) {
        if checked {
            out.push_str(r#"<input type="checkbox" checked disabled> "#);
        } else {
            out.push_str(r#"<input type="checkbox" disabled> "#);
        }
    }

    /// Render raw HTML found in the source.
    ///
    /// Default drops it and leaves a marker comment.
    fn raw_html(_html: &str, out: &mut String) {
        out.push_str("<!-- raw HTML omitted -->");
    }
}
