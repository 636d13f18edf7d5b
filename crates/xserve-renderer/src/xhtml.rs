//! XHTML backend for markdown rendering.
//!
//! Produces well-formed fragments: void elements self-close and boolean
//! attributes carry explicit values, so pages stay valid when embedded.

use std::borrow::Cow;
use std::fmt::Write;

use crate::backend::RenderBackend;
use crate::text::escape_html;
use crate::util::{MARKUP_SUFFIX, PAGE_SUFFIX};

/// XHTML backend.
///
/// - `<br />`, `<hr />`, `<img ... />`, `<input ... />`
/// - every newline inside a paragraph is a hard break
/// - dangerous URL schemes are blanked
/// - relative links to `.md` documents point at the generated `.html` page
pub struct XhtmlBackend;

impl RenderBackend for XhtmlBackend {
    fn code_block(lang: Option<&str>, content: &str, out: &mut String) {
        if let Some(lang) = lang {
            let _ = write!(
                out,
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                escape_html(lang),
                escape_html(content)
            );
        } else {
            let _ = write!(out, "<pre><code>{}</code></pre>", escape_html(content));
        }
    }

    fn image(src: &str, alt: &str, title: &str, out: &mut String) {
        let title_attr = if title.is_empty() {
            String::new()
        } else {
            format!(r#" title="{}""#, escape_html(title))
        };
        let _ = write!(
            out,
            r#"<img src="{}" alt="{}"{title_attr} />"#,
            escape_html(src),
            escape_html(alt)
        );
    }

    fn transform_url(url: &str) -> Cow<'_, str> {
        if is_dangerous_url(url) {
            return Cow::Borrowed("");
        }
        rewrite_markup_link(url)
    }

    fn hard_break(out: &mut String) {
        out.push_str("<br />\n");
    }

    fn soft_break(out: &mut String) {
        Self::hard_break(out);
    }

    fn horizontal_rule(out: &mut String) {
        out.push_str("<hr />");
    }

    fn task_list_marker(checked: bool, out: &mut String) {
        if checked {
            out.push_str(r#"<input checked="" disabled="" type="checkbox" /> "#);
        } else {
            out.push_str(r#"<input disabled="" type="checkbox" /> "#);
        }
    }
}

/// Whether a URL uses a scheme that must not reach the browser.
///
/// Inline `data:` images in common raster formats are allowed.
fn is_dangerous_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();

    if let Some(rest) = lower.strip_prefix("data:image/") {
        return !["png", "gif", "jpeg", "webp"]
            .iter()
            .any(|format| rest.starts_with(format));
    }

    ["javascript:", "vbscript:", "file:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}

/// Point relative links at sibling markdown documents to their generated page.
///
/// - `guide.md` → `guide.html`
/// - `guide.md#setup` → `guide.html#setup`
///
/// Absolute URLs, fragments and non-markdown targets are returned unchanged.
fn rewrite_markup_link(url: &str) -> Cow<'_, str> {
    if url.starts_with('#') || url.starts_with('/') || has_scheme(url) {
        return Cow::Borrowed(url);
    }

    let split = url.find(['#', '?']).unwrap_or(url.len());
    let (path, rest) = url.split_at(split);

    match path.strip_suffix(MARKUP_SUFFIX) {
        Some(base) if !base.is_empty() && !base.ends_with('/') => {
            Cow::Owned(format!("{base}{PAGE_SUFFIX}{rest}"))
        }
        _ => Cow::Borrowed(url),
    }
}

/// Whether the URL starts with `scheme:` (RFC 3986 scheme characters).
fn has_scheme(url: &str) -> bool {
    let Some(colon) = url.find(':') else {
        return false;
    };
    let scheme = &url[..colon];
    scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
