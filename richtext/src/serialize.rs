//! HTML serialization of a document tree.
//!
//! Output is a pure function of the document: blocks are emitted depth-first
//! with no separators, text and link targets are always escaped, and marks
//! nest in a fixed order (`strong`, `em`, `u`, `mark`, `del`, outermost
//! first) no matter how they were applied.

use std::borrow::Cow;

use crate::document::mark::Mark;
use crate::document::{Block, BlockKind, Document, Node, TextRun};

pub fn serialize(doc: &Document) -> String {
    let mut out = String::new();
    for block in &doc.blocks {
        write_block(&mut out, block);
    }
    out
}

pub fn serialize_node(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

/// Escape the five HTML-significant characters. Borrows when nothing needs escaping.
pub fn escape_html(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(raw);
    }
    let mut escaped = String::with_capacity(raw.len() + 16);
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Text(run) => write_run(out, run),
        Node::Block(block) => write_block(out, block),
    }
}

fn write_block(out: &mut String, block: &Block) {
    let (open, close) = match block.kind {
        BlockKind::Link => {
            let href = escape_html(block.url().unwrap_or_default());
            (format!("<a href=\"{}\">", href), "</a>")
        }
        BlockKind::Code => ("<pre><code>".to_string(), "</code></pre>"),
        BlockKind::Paragraph => ("<p>".to_string(), "</p>"),
    };
    out.push_str(&open);
    for child in &block.children {
        write_node(out, child);
    }
    out.push_str(close);
}

fn write_run(out: &mut String, run: &TextRun) {
    for mark in run.marks.iter() {
        out.push_str(tag(mark).0);
    }
    out.push_str(&escape_html(&run.text));
    for mark in Mark::ALL.iter().rev().filter(|m| run.marks.contains(**m)) {
        out.push_str(tag(*mark).1);
    }
}

fn tag(mark: Mark) -> (&'static str, &'static str) {
    match mark {
        Mark::Bold => ("<strong>", "</strong>"),
        Mark::Italic => ("<em>", "</em>"),
        Mark::Underline => ("<u>", "</u>"),
        Mark::Highlight => ("<mark>", "</mark>"),
        Mark::Strikethrough => ("<del>", "</del>"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_borrows_clean_text() {
        assert!(matches!(escape_html("plain text"), Cow::Borrowed(_)));
        assert_eq!(escape_html("a & b"), "a &amp; b");
    }

    #[test]
    fn all_marks_nest_in_fixed_order() {
        let run = TextRun::with_marks("x", &Mark::ALL);
        assert_eq!(
            serialize_node(&run.into()),
            "<strong><em><u><mark><del>x</del></mark></u></em></strong>"
        );
    }

    #[test]
    fn empty_run_keeps_its_tags() {
        let run = TextRun::with_marks("", &[Mark::Highlight]);
        assert_eq!(serialize_node(&run.into()), "<mark></mark>");
    }
}
