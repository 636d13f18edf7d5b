//! Per-document state tracked while walking markdown events.

use std::collections::HashSet;

use pulldown_cmark::{Alignment, CodeBlockKind};

use crate::text::slugify;

/// Code block whose text is being collected.
pub(crate) struct CodeBlock {
    pub(crate) language: Option<String>,
    pub(crate) text: String,
}

impl CodeBlock {
    /// Only the first word of a fence info string names the language.
    pub(crate) fn new(kind: &CodeBlockKind<'_>) -> Self {
        let language = match kind {
            CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(ToOwned::to_owned),
            CodeBlockKind::Indented => None,
        };
        Self {
            language,
            text: String::new(),
        }
    }
}

/// Column alignments and cursor position of the table being rendered.
#[derive(Default)]
pub(crate) struct TableLayout {
    columns: Vec<Alignment>,
    column: usize,
    in_head: bool,
    has_body: bool,
}

impl TableLayout {
    pub(crate) fn open(&mut self, columns: Vec<Alignment>) {
        *self = Self {
            columns,
            ..Self::default()
        };
    }

    pub(crate) fn enter_head(&mut self) {
        self.in_head = true;
        self.column = 0;
    }

    pub(crate) fn leave_head(&mut self) {
        self.in_head = false;
    }

    /// Start a body row. Returns `true` for the first one, which opens `<tbody>`.
    pub(crate) fn begin_row(&mut self) -> bool {
        self.column = 0;
        !std::mem::replace(&mut self.has_body, true)
    }

    pub(crate) fn cell_tag(&self) -> &'static str {
        if self.in_head { "th" } else { "td" }
    }

    /// XHTML `align` attribute for the current column.
    pub(crate) fn align_attr(&self) -> &'static str {
        match self.columns.get(self.column) {
            Some(Alignment::Left) => r#" align="left""#,
            Some(Alignment::Center) => r#" align="center""#,
            Some(Alignment::Right) => r#" align="right""#,
            Some(Alignment::None) | None => "",
        }
    }

    pub(crate) fn next_column(&mut self) {
        self.column += 1;
    }

    /// Closing markup; `<tbody>` is only present when a body row was seen.
    pub(crate) fn close(&self) -> &'static str {
        if self.has_body {
            "</tbody></table>"
        } else {
            "</table>"
        }
    }
}

/// Image alt text capture.
///
/// Images can nest (an image inside a link inside alt text), so the depth is
/// counted rather than flagged.
#[derive(Default)]
pub(crate) struct ImageState {
    depth: usize,
    alt_text: String,
}

impl ImageState {
    pub(crate) fn start(&mut self) {
        if self.depth == 0 {
            self.alt_text.clear();
        }
        self.depth += 1;
    }

    /// End image capture. Returns the alt text once the outermost image closes.
    pub(crate) fn end(&mut self) -> Option<String> {
        self.depth = self.depth.saturating_sub(1);
        (self.depth == 0).then(|| std::mem::take(&mut self.alt_text))
    }

    pub(crate) fn is_active(&self) -> bool {
        self.depth > 0
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.alt_text.push_str(text);
    }
}

/// Heading whose content is being collected.
pub(crate) struct OpenHeading {
    pub(crate) level: u8,
    /// Plain text, used for the slug.
    pub(crate) text: String,
    /// Content with inline markup.
    pub(crate) html: String,
}

impl OpenHeading {
    pub(crate) fn new(level: u8) -> Self {
        Self {
            level,
            text: String::new(),
            html: String::new(),
        }
    }
}

/// Anchor IDs handed out within one document.
#[derive(Default)]
pub(crate) struct HeadingIds {
    taken: HashSet<String>,
}

impl HeadingIds {
    /// Allocate a unique ID for a heading with the given text.
    ///
    /// Repeats get `-1`, `-2`, ... and a suffix already used by an explicit
    /// heading (`## FAQ 1` before two `## FAQ`) is skipped.
    pub(crate) fn allocate(&mut self, text: &str) -> String {
        let slug = match slugify(text) {
            s if s.is_empty() => "heading".to_owned(),
            s => s,
        };

        let id = if self.taken.contains(&slug) {
            (1..)
                .map(|n| format!("{slug}-{n}"))
                .find(|candidate| !self.taken.contains(candidate))
                .unwrap_or_default()
        } else {
            slug
        };
        self.taken.insert(id.clone());
        id
    }
}
