//! Text escaping and slug helpers.

use std::borrow::Cow;

/// Escape text for use in element content or a double-quoted attribute.
///
/// Borrows the input when nothing needs escaping.
#[must_use]
pub fn escape_html(s: &str) -> Cow<'_, str> {
    let Some(first) = s.find(['&', '<', '>', '"']) else {
        return Cow::Borrowed(s);
    };

    let mut escaped = String::with_capacity(s.len() + 16);
    escaped.push_str(&s[..first]);
    for c in s[first..].chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Lowercase slug of `text` for heading anchors.
///
/// Letters and digits (any script) are kept, runs of whitespace, `-` and `_`
/// become a single dash, everything else is dropped. The slug never starts or
/// ends with a dash.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut separator = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if separator && !slug.is_empty() {
                slug.push('-');
            }
            separator = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            separator = true;
        }
    }

    slug
}
