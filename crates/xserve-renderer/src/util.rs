//! Shared utility functions for markdown rendering.

use pulldown_cmark::HeadingLevel;

/// Suffix of markup source documents.
pub const MARKUP_SUFFIX: &str = ".md";

/// Suffix of generated pages.
pub const PAGE_SUFFIX: &str = ".html";

/// Strip a trailing markup suffix from a document name.
///
/// A name that is nothing but the suffix strips to an empty base, so `.md`
/// is published as `.html`.
///
/// # Examples
///
/// ```
/// use xserve_renderer::strip_markup_suffix;
///
/// assert_eq!(strip_markup_suffix("notes.md"), "notes");
/// assert_eq!(strip_markup_suffix("readme"), "readme");
/// assert_eq!(strip_markup_suffix("archive.md.txt"), "archive.md.txt");
/// ```
pub fn strip_markup_suffix(name: &str) -> &str {
    name.strip_suffix(MARKUP_SUFFIX).unwrap_or(name)
}

/// Derive the generated page filename for a document name.
///
/// # Examples
///
/// ```
/// use xserve_renderer::page_file_name;
///
/// assert_eq!(page_file_name("notes.md"), "notes.html");
/// assert_eq!(page_file_name("readme"), "readme.html");
/// ```
pub fn page_file_name(name: &str) -> String {
    format!("{}{PAGE_SUFFIX}", strip_markup_suffix(name))
}

/// Convert heading level enum to number (1-6).
#[must_use]
pub(crate) fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
