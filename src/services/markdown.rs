//! Markdown to Pango markup for assistant bubbles.
//!
//! Replies are shown in a single wrapping label, so block structure is
//! flattened into lines: headings become bold text, list items get bullet or
//! number prefixes, tables become ` | `-separated rows.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

struct ListState {
    next_number: Option<u64>,
}

#[derive(Default)]
struct Renderer {
    out: String,
    lists: Vec<ListState>,
    in_code_block: bool,
    cell_index: usize,
}

impl Renderer {
    fn text(&mut self, text: &str) {
        self.out.push_str(&glib::markup_escape_text(text));
    }

    fn tag(&mut self, tag: &str) {
        self.out.push_str(tag);
    }

    /// Start a new block on its own line, with a blank line between
    /// top-level blocks.
    fn block_break(&mut self) {
        if self.out.is_empty() {
            return;
        }
        let spacing = if self.lists.is_empty() { "\n\n" } else { "\n" };
        while self.out.ends_with('\n') {
            self.out.pop();
        }
        self.out.push_str(spacing);
    }

    fn start(&mut self, tag: Tag) {
        match tag {
            Tag::Paragraph => {
                // Loose list items open a paragraph right after the bullet.
                if !self.out.ends_with(' ') && !self.out.ends_with("<i>") {
                    self.block_break();
                }
            }
            Tag::Heading { level, .. } => {
                self.block_break();
                let size = match level {
                    HeadingLevel::H1 | HeadingLevel::H2 => "<big><b>",
                    _ => "<b>",
                };
                self.tag(size);
            }
            Tag::BlockQuote(_) => {
                self.block_break();
                self.tag("<i>");
            }
            Tag::CodeBlock(kind) => {
                self.block_break();
                self.in_code_block = true;
                if let CodeBlockKind::Fenced(lang) = &kind {
                    if !lang.trim().is_empty() {
                        self.tag("<small>");
                        self.text(lang.trim());
                        self.tag("</small>\n");
                    }
                }
                self.tag("<tt>");
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.block_break();
                }
                self.lists.push(ListState { next_number: start });
            }
            Tag::Item => {
                if !self.out.is_empty() && !self.out.ends_with('\n') {
                    self.out.push('\n');
                }
                let depth = self.lists.len().saturating_sub(1);
                self.out.push_str(&"    ".repeat(depth));
                let prefix = match self.lists.last_mut() {
                    Some(ListState {
                        next_number: Some(n),
                    }) => {
                        let prefix = format!("{}. ", n);
                        *n += 1;
                        prefix
                    }
                    _ => "• ".to_string(),
                };
                self.out.push_str(&prefix);
            }
            Tag::Table(_) => self.block_break(),
            Tag::TableHead => self.tag("<b>"),
            Tag::TableRow => {
                if !self.out.ends_with('\n') {
                    self.out.push('\n');
                }
                self.cell_index = 0;
            }
            Tag::TableCell => {
                if self.cell_index > 0 {
                    self.tag(" | ");
                }
                self.cell_index += 1;
            }
            Tag::Emphasis => self.tag("<i>"),
            Tag::Strong => self.tag("<b>"),
            Tag::Strikethrough => self.tag("<s>"),
            Tag::Link { dest_url, .. } => {
                self.tag("<a href=\"");
                self.text(&dest_url);
                self.tag("\">");
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(level) => match level {
                HeadingLevel::H1 | HeadingLevel::H2 => self.tag("</b></big>"),
                _ => self.tag("</b>"),
            },
            TagEnd::BlockQuote(_) => self.tag("</i>"),
            TagEnd::CodeBlock => {
                while self.out.ends_with('\n') {
                    self.out.pop();
                }
                self.tag("</tt>");
                self.in_code_block = false;
            }
            TagEnd::List(_) => {
                self.lists.pop();
            }
            TagEnd::TableHead => {
                self.tag("</b>");
                self.cell_index = 0;
            }
            TagEnd::Emphasis => self.tag("</i>"),
            TagEnd::Strong => self.tag("</b>"),
            TagEnd::Strikethrough => self.tag("</s>"),
            TagEnd::Link => self.tag("</a>"),
            _ => {}
        }
    }

    fn finish(mut self) -> String {
        while self.out.ends_with('\n') {
            self.out.pop();
        }
        self.out
    }
}

/// Render markdown as Pango markup suitable for `gtk::Label::set_markup`.
pub fn to_pango_markup(input: &str) -> String {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;
    let mut renderer = Renderer::default();

    for event in Parser::new_ext(input, options) {
        match event {
            Event::Start(tag) => renderer.start(tag),
            Event::End(tag) => renderer.end(tag),
            Event::Text(text) => renderer.text(&text),
            Event::Code(code) => {
                renderer.tag("<tt>");
                renderer.text(&code);
                renderer.tag("</tt>");
            }
            Event::SoftBreak => {
                if renderer.in_code_block {
                    renderer.out.push('\n');
                } else {
                    renderer.out.push(' ');
                }
            }
            Event::HardBreak => renderer.out.push('\n'),
            Event::Rule => {
                renderer.block_break();
                renderer.tag("──────────");
            }
            Event::Html(html) | Event::InlineHtml(html) => renderer.text(&html),
            _ => {}
        }
    }

    renderer.finish()
}
