//! Generic markdown renderer with pluggable backend.

use std::borrow::Cow;
use std::fmt::Write;
use std::marker::PhantomData;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, TextMergeStream};

use crate::autolink::linkify;
use crate::backend::RenderBackend;
use crate::state::{CodeBlock, HeadingIds, ImageState, OpenHeading, TableLayout};
use crate::text::escape_html;
use crate::util::heading_level_to_num;

/// Generic markdown renderer with pluggable backend.
///
/// Uses the [`RenderBackend`] trait to delegate format-specific rendering
/// while handling common elements (tables, lists, inline formatting) generically.
///
/// A renderer carries per-document state (heading IDs, open tables), so use
/// one instance per document.
pub struct MarkdownRenderer<B: RenderBackend> {
    output: String,
    code: Option<CodeBlock>,
    table: TableLayout,
    image: ImageState,
    heading: Option<OpenHeading>,
    heading_ids: HeadingIds,
    pending_images: Vec<(String, String)>,
    link_depth: usize,
    autolink: bool,
    _backend: PhantomData<B>,
}

impl<B: RenderBackend> MarkdownRenderer<B> {
    /// Create a new renderer with bare URL autolinking enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
            code: None,
            table: TableLayout::default(),
            image: ImageState::default(),
            heading: None,
            heading_ids: HeadingIds::default(),
            pending_images: Vec::new(),
            link_depth: 0,
            autolink: true,
            _backend: PhantomData,
        }
    }

    /// Enable or disable linking of bare `http(s)://` and `www.` URLs.
    #[must_use]
    pub fn with_autolink(mut self, enabled: bool) -> Self {
        self.autolink = enabled;
        self
    }

    /// Parser options for the supported extension set.
    ///
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    #[must_use]
    pub fn parser_options() -> Options {
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
    }

    /// Create a configured parser for the given markdown text.
    #[must_use]
    pub fn create_parser(markdown: &str) -> Parser<'_> {
        Parser::new_ext(markdown, Self::parser_options())
    }

    /// Render markdown text using the configured parser options.
    pub fn render_markdown(&mut self, markdown: &str) -> String {
        // Adjacent text events are merged so URLs split by the parser stay whole.
        self.render(TextMergeStream::new(Self::create_parser(markdown)))
    }

    /// Render markdown events and return the HTML fragment.
    pub fn render<'a, I>(&mut self, events: I) -> String
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            self.process_event(event);
        }
        std::mem::take(&mut self.output)
    }

    /// Push content to output or heading buffer based on context.
    fn push_inline(&mut self, content: &str) {
        if self.image.is_active() {
            // Alt text is plain text only.
            return;
        }
        match &mut self.heading {
            Some(heading) => heading.html.push_str(content),
            None => self.output.push_str(content),
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            // The marker for the whole block was written when it opened.
            Event::Html(_) => {}
            Event::InlineHtml(html) => self.raw_html(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.hard_break(),
            Event::Rule => B::horizontal_rule(&mut self.output),
            Event::TaskListMarker(checked) => B::task_list_marker(checked, &mut self.output),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Not supported
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => {
                // Opening tag is written in end_tag once the ID is known.
                self.heading = Some(OpenHeading::new(heading_level_to_num(level)));
            }
            Tag::BlockQuote(_) => B::blockquote_start(&mut self.output),
            Tag::CodeBlock(kind) => self.code = Some(CodeBlock::new(&kind)),
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>"),
                Some(n) => {
                    let _ = write!(self.output, r#"<ol start="{n}">"#);
                }
                None => self.output.push_str("<ul>"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::HtmlBlock => B::raw_html("", &mut self.output),
            Tag::FootnoteDefinition(_) | Tag::MetadataBlock(_) => {}
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::Table(alignments) => {
                self.table.open(alignments);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.enter_head();
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                if self.table.begin_row() {
                    self.output.push_str("<tbody>");
                }
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let _ = write!(
                    self.output,
                    "<{}{}>",
                    self.table.cell_tag(),
                    self.table.align_attr()
                );
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<del>"),
            Tag::Link {
                dest_url, title, ..
            } => {
                self.link_depth += 1;
                if self.image.is_active() {
                    return;
                }
                let href = B::transform_url(&dest_url);
                let link_tag = if title.is_empty() {
                    format!(r#"<a href="{}">"#, escape_html(&href))
                } else {
                    format!(
                        r#"<a href="{}" title="{}">"#,
                        escape_html(&href),
                        escape_html(&title)
                    )
                };
                self.push_inline(&link_tag);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                // Alt text is collected until the matching end tag.
                self.image.start();
                self.pending_images
                    .push((B::transform_url(&dest_url).into_owned(), title.to_string()));
            }
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(_) => {
                if let Some(heading) = self.heading.take() {
                    let id = self.heading_ids.allocate(&heading.text);
                    let _ = write!(
                        self.output,
                        r#"<h{level} id="{id}">{html}</h{level}>"#,
                        level = heading.level,
                        html = heading.html.trim()
                    );
                }
            }
            TagEnd::BlockQuote(_) => B::blockquote_end(&mut self.output),
            TagEnd::CodeBlock => {
                if let Some(block) = self.code.take() {
                    B::code_block(block.language.as_deref(), &block.text, &mut self.output);
                }
            }
            TagEnd::List(ordered) => {
                self.output
                    .push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::HtmlBlock | TagEnd::FootnoteDefinition | TagEnd::MetadataBlock(_) => {}
            TagEnd::Image => {
                let pending = self.pending_images.pop();
                if let (Some(alt), Some((src, title))) = (self.image.end(), pending) {
                    let mut img = String::new();
                    B::image(&src, &alt, &title, &mut img);
                    self.push_inline(&img);
                }
            }
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::Table => self.output.push_str(self.table.close()),
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead>");
                self.table.leave_head();
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                let _ = write!(self.output, "</{}>", self.table.cell_tag());
                self.table.next_column();
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</del>"),
            TagEnd::Link => {
                self.link_depth = self.link_depth.saturating_sub(1);
                if !self.image.is_active() {
                    self.push_inline("</a>");
                }
            }
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(block) = &mut self.code {
            block.text.push_str(text);
            return;
        }
        if self.image.is_active() {
            self.image.push_str(text);
            return;
        }

        let html: Cow<'_, str> = if self.autolink && self.link_depth == 0 {
            linkify(text).into()
        } else {
            escape_html(text)
        };

        match &mut self.heading {
            Some(heading) => {
                heading.text.push_str(text);
                heading.html.push_str(&html);
            }
            None => self.output.push_str(&html),
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
            return;
        }
        if let Some(heading) = &mut self.heading {
            heading.text.push_str(code);
        }
        self.push_inline(&format!("<code>{}</code>", escape_html(code)));
    }

    fn raw_html(&mut self, html: &str) {
        let mut marker = String::new();
        B::raw_html(html, &mut marker);
        self.push_inline(&marker);
    }

    fn soft_break(&mut self) {
        if self.image.is_active() {
            self.image.push_str(" ");
        } else if let Some(heading) = &mut self.heading {
            heading.text.push(' ');
            B::soft_break(&mut heading.html);
        } else {
            B::soft_break(&mut self.output);
        }
    }

    fn hard_break(&mut self) {
        if let Some(heading) = &mut self.heading {
            heading.text.push(' ');
        }
        let mut br = String::new();
        B::hard_break(&mut br);
        self.push_inline(&br);
    }
}

impl<B: RenderBackend> Default for MarkdownRenderer<B> {
    fn default() -> Self {
        Self::new()
    }
}
