use std::ops::Range;

use pulldown_cmark::{Event, Options, Parser as CmarkParser, Tag, TagEnd};

use crate::document::mark::{Mark, MarkSet};
use crate::document::{Block, BlockKind, Document, Node, TextRun};
use crate::parser::Parsed;
use crate::parser::issue::{ImportIssue, IssueKind};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Import Markdown source as a document of paragraphs, code blocks and links.
pub fn parse_document(source: &str, file_id: usize) -> Result<Parsed, Vec<ImportIssue>> {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;
    let parser = CmarkParser::new_ext(source, options);

    let mut state = ImportState::new(file_id);
    for (event, range) in parser.into_offset_iter() {
        state.process(event, range);
    }
    state.finalize()
}

// ---------------------------------------------------------------------------
// Import state
// ---------------------------------------------------------------------------

struct ImportState {
    file_id: usize,
    blocks: Vec<Block>,
    /// Block currently receiving inline content.
    current: Option<BlockBuilder>,
    /// Open-tag depth per mark, indexed by `Mark as usize`.
    mark_depth: [u32; 5],
    warnings: Vec<ImportIssue>,
}

struct BlockBuilder {
    kind: BlockKind,
    children: Vec<Node>,
    link: Option<LinkBuilder>,
    /// Opened for bare text (tight list items, table cells) rather than by a
    /// paragraph tag; closed by the end of the enclosing container.
    implicit: bool,
}

struct LinkBuilder {
    url: String,
    children: Vec<Node>,
}

impl ImportState {
    fn new(file_id: usize) -> Self {
        ImportState {
            file_id,
            blocks: Vec::new(),
            current: None,
            mark_depth: [0; 5],
            warnings: Vec::new(),
        }
    }

    fn process(&mut self, event: Event<'_>, range: Range<usize>) {
        match event {
            Event::Start(Tag::Paragraph) => self.open(BlockKind::Paragraph, false),
            Event::Start(Tag::Heading { .. }) => {
                self.warn(IssueKind::Heading, range);
                self.open(BlockKind::Paragraph, false);
            }
            Event::Start(Tag::CodeBlock(_)) => self.open(BlockKind::Code, false),
            Event::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::CodeBlock) => {
                self.close();
            }

            Event::Start(Tag::Strong) => self.enter(Mark::Bold),
            Event::End(TagEnd::Strong) => self.leave(Mark::Bold),
            Event::Start(Tag::Emphasis) => self.enter(Mark::Italic),
            Event::End(TagEnd::Emphasis) => self.leave(Mark::Italic),
            Event::Start(Tag::Strikethrough) => self.enter(Mark::Strikethrough),
            Event::End(TagEnd::Strikethrough) => self.leave(Mark::Strikethrough),

            Event::Start(Tag::Link { dest_url, .. }) => {
                if dest_url.is_empty() {
                    self.warn(IssueKind::EmptyLink, range);
                } else {
                    self.open_link(dest_url.to_string());
                }
            }
            Event::End(TagEnd::Link) => self.close_link(),

            Event::Start(Tag::Image { .. }) => {
                self.warn(IssueKind::Image, range);
            }
            Event::Start(Tag::List(_)) => {
                self.close_implicit();
                self.warn(IssueKind::List, range);
            }
            Event::Start(Tag::Item | Tag::TableCell) => self.close_implicit(),
            Event::Start(Tag::BlockQuote(_)) => {
                self.warn(IssueKind::BlockQuote, range);
            }
            Event::Start(Tag::Table(_)) => {
                self.warn(IssueKind::Table, range);
            }
            Event::Start(Tag::HtmlBlock) => {
                self.warn(IssueKind::HtmlBlock, range);
            }
            Event::End(TagEnd::Item | TagEnd::TableCell) => self.close_implicit(),

            Event::Text(text) | Event::Code(text) => self.push_text(&text),
            Event::SoftBreak => self.push_text(" "),
            Event::HardBreak => self.push_text("\n"),
            Event::InlineHtml(html) => self.inline_html(&html, range),
            Event::Rule => self.warn(IssueKind::Rule, range),

            _ => {}
        }
    }

    fn open(&mut self, kind: BlockKind, implicit: bool) {
        if self.current.is_some() {
            self.close();
        }
        self.current = Some(BlockBuilder {
            kind,
            children: Vec::new(),
            link: None,
            implicit,
        });
    }

    fn close(&mut self) {
        // Inline formatting never spans a block boundary; an unclosed tag
        // ends with its block.
        self.mark_depth = [0; 5];
        let Some(mut builder) = self.current.take() else {
            return;
        };
        if let Some(link) = builder.link.take() {
            builder.children.push(finish_link(link));
        }

        if builder.kind == BlockKind::Code {
            let mut code: String = builder
                .children
                .iter()
                .filter_map(Node::as_text)
                .map(|run| run.text.as_str())
                .collect();
            if code.ends_with('\n') {
                code.pop();
            }
            builder.children = vec![TextRun::plain(code).into()];
        }

        if builder.children.is_empty() {
            builder.children.push(TextRun::plain("").into());
        }
        self.blocks.push(Block::new(builder.kind, builder.children));
    }

    fn close_implicit(&mut self) {
        if self.current.as_ref().is_some_and(|b| b.implicit) {
            self.close();
        }
    }

    fn open_link(&mut self, url: String) {
        let builder = self.ensure_block();
        builder.link = Some(LinkBuilder {
            url,
            children: Vec::new(),
        });
    }

    fn close_link(&mut self) {
        if let Some(builder) = self.current.as_mut() {
            if let Some(link) = builder.link.take() {
                builder.children.push(finish_link(link));
            }
        }
    }

    fn ensure_block(&mut self) -> &mut BlockBuilder {
        self.current.get_or_insert_with(|| BlockBuilder {
            kind: BlockKind::Paragraph,
            children: Vec::new(),
            link: None,
            implicit: true,
        })
    }

    fn enter(&mut self, mark: Mark) {
        self.mark_depth[mark as usize] += 1;
    }

    fn leave(&mut self, mark: Mark) {
        let depth = &mut self.mark_depth[mark as usize];
        *depth = depth.saturating_sub(1);
    }

    fn active_marks(&self) -> MarkSet {
        Mark::ALL
            .into_iter()
            .filter(|mark| self.mark_depth[*mark as usize] > 0)
            .collect()
    }

    fn push_text(&mut self, text: &str) {
        let marks = self.active_marks();
        let builder = self.ensure_block();
        let marks = if builder.kind == BlockKind::Code {
            MarkSet::empty()
        } else {
            marks
        };
        let target = match builder.link.as_mut() {
            Some(link) => &mut link.children,
            None => &mut builder.children,
        };
        append_text(target, text, marks);
    }

    /// Inline formatting tags the editor renders itself are folded back into
    /// marks; anything else stays as literal text.
    fn inline_html(&mut self, html: &str, range: Range<usize>) {
        let tag = html.trim();
        let (closing, name) = match tag.strip_prefix("</") {
            Some(rest) => (true, rest),
            None => (false, tag.strip_prefix('<').unwrap_or(tag)),
        };
        let name = name
            .trim_end_matches('>')
            .trim_end_matches('/')
            .trim()
            .to_ascii_lowercase();

        let mark = match name.as_str() {
            "strong" | "b" => Some(Mark::Bold),
            "em" | "i" => Some(Mark::Italic),
            "u" => Some(Mark::Underline),
            "mark" => Some(Mark::Highlight),
            "del" | "s" => Some(Mark::Strikethrough),
            "br" => {
                self.push_text("\n");
                return;
            }
            _ => None,
        };

        match mark {
            Some(mark) if closing => self.leave(mark),
            Some(mark) => self.enter(mark),
            None => {
                self.push_text(html);
                self.warn(IssueKind::InlineHtml(html.to_string()), range);
            }
        }
    }

    fn warn(&mut self, kind: IssueKind, range: Range<usize>) {
        self.warnings.push(ImportIssue::new(kind, range, self.file_id));
    }

    fn finalize(mut self) -> Result<Parsed, Vec<ImportIssue>> {
        self.close();

        if self.blocks.is_empty() {
            return Err(vec![ImportIssue::new(IssueKind::NoBlocks, 0..0, self.file_id)]);
        }

        Ok(Parsed {
            document: Document::new(self.blocks),
            warnings: self.warnings,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn finish_link(link: LinkBuilder) -> Node {
    let mut children = link.children;
    if children.is_empty() {
        children.push(TextRun::plain("").into());
    }
    Block::link(link.url, children).into()
}

/// Append text, extending the previous run when its marks match.
fn append_text(nodes: &mut Vec<Node>, text: &str, marks: MarkSet) {
    if let Some(Node::Text(last)) = nodes.last_mut() {
        if last.marks == marks {
            last.text.push_str(text);
            return;
        }
    }
    nodes.push(TextRun::new(text, marks).into());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import(source: &str) -> Parsed {
        parse_document(source, 0).expect("import failed")
    }

    #[test]
    fn split_text_events_are_merged() {
        let parsed = import("it's a & b");
        let runs = parsed.document.blocks[0].runs();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "it's a & b");
    }

    #[test]
    fn nested_emphasis_accumulates_marks() {
        let parsed = import("***both*** plain");
        let runs = parsed.document.blocks[0].runs();
        assert_eq!(runs[0].text, "both");
        assert!(runs[0].has(Mark::Bold) && runs[0].has(Mark::Italic));
        assert_eq!(runs[1].text, " plain");
        assert!(runs[1].marks.is_empty());
    }

    #[test]
    fn unknown_inline_html_is_literal() {
        let parsed = import("a <span>b</span>");
        assert_eq!(parsed.document.blocks[0].plain_text(), "a <span>b</span>");
        assert_eq!(parsed.warnings.len(), 2);
    }

    #[test]
    fn unclosed_inline_tag_ends_with_its_paragraph() {
        let parsed = import("<u>a\n\nb");
        let first = parsed.document.blocks[0].runs();
        let second = parsed.document.blocks[1].runs();
        assert!(first[0].has(Mark::Underline));
        assert_eq!(second[0].text, "b");
        assert!(second[0].marks.is_empty());
    }

    #[test]
    fn tight_list_items_become_paragraphs() {
        let parsed = import("- one\n- two\n");
        let texts: Vec<String> = parsed
            .document
            .blocks
            .iter()
            .map(|b| b.plain_text())
            .collect();
        assert_eq!(texts, vec!["one", "two"]);
        assert_eq!(parsed.warnings.len(), 1);
    }

    #[test]
    fn empty_source_is_an_error() {
        let errors = parse_document("   \n", 3).unwrap_err();
        assert_eq!(errors[0].kind, IssueKind::NoBlocks);
        assert_eq!(errors[0].file_id, 3);
    }
}
