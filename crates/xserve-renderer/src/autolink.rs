//! Bare URL autolinking for text outside links and code.
//!
//! Follows the GFM extended autolink rules closely enough for prose:
//! `http://`, `https://` and `www.` prefixes, trailing punctuation is not part
//! of the link, and a closing parenthesis is kept only when balanced.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::text::escape_html;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:https?://|www\.)[^\s<]+").unwrap());

/// Escape `text` as HTML, wrapping bare URLs in anchors.
pub(crate) fn linkify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for m in URL_RE.find_iter(text) {
        let candidate = trim_trailing(m.as_str());
        if !has_host(candidate) {
            continue;
        }
        let end = m.start() + candidate.len();

        out.push_str(&escape_html(&text[last..m.start()]));
        let href = if candidate.starts_with("www.") {
            format!("http://{candidate}")
        } else {
            candidate.to_owned()
        };
        let _ = write!(
            out,
            r#"<a href="{}">{}</a>"#,
            escape_html(&href),
            escape_html(candidate)
        );
        last = end;
    }

    out.push_str(&escape_html(&text[last..]));
    out
}

/// Drop trailing punctuation and unbalanced closing parentheses.
fn trim_trailing(mut url: &str) -> &str {
    loop {
        let Some(last) = url.chars().last() else {
            return url;
        };
        let trim = match last {
            '?' | '!' | '.' | ',' | ':' | '*' | '_' | '~' | '\'' | '"' | ';' => true,
            ')' => url.matches(')').count() > url.matches('(').count(),
            _ => false,
        };
        if !trim {
            return url;
        }
        url = &url[..url.len() - last.len_utf8()];
    }
}

/// Whether anything follows the scheme or `www.` prefix.
fn has_host(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .or_else(|| url.strip_prefix("www."))
        .unwrap_or("");
    rest.starts_with(|c: char| c.is_alphanumeric())
}
