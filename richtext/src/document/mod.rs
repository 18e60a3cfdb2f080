pub mod mark;
pub mod validate;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::document::mark::{Mark, MarkSet};
use crate::error::Error;

/// A rich-text document: an ordered sequence of top-level blocks.
/// A valid document always holds at least one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Document { blocks }
    }

    /// The value an editor starts with when it is mounted without content.
    pub fn seed() -> Self {
        Document {
            blocks: vec![
                Block::paragraph(vec![TextRun::plain("A line of text in a paragraph.").into()]),
                Block::paragraph(vec![
                    TextRun::plain(
                        "Since it's rich text, you can do things like turn a selection of text \
                         bold, or add a semantically rendered block quote in the middle of the \
                         page, like this:",
                    )
                    .into(),
                ]),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// A node inside a block: either a nested block or a leaf text run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Block(Block),
    Text(TextRun),
}

impl Node {
    pub fn as_text(&self) -> Option<&TextRun> {
        match self {
            Node::Text(run) => Some(run),
            Node::Block(_) => None,
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Node::Block(block) => Some(block),
            Node::Text(_) => None,
        }
    }
}

impl From<TextRun> for Node {
    fn from(run: TextRun) -> Self {
        Node::Text(run)
    }
}

impl From<Block> for Node {
    fn from(block: Block) -> Self {
        Node::Block(block)
    }
}

/// A leaf holding raw text and the marks applied to all of it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextRun {
    pub text: String,
    pub marks: MarkSet,
}

impl TextRun {
    pub fn new(text: impl Into<String>, marks: MarkSet) -> Self {
        TextRun {
            text: text.into(),
            marks,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        TextRun::new(text, MarkSet::empty())
    }

    pub fn with_marks(text: impl Into<String>, marks: &[Mark]) -> Self {
        TextRun::new(text, marks.iter().copied().collect())
    }

    pub fn has(&self, mark: Mark) -> bool {
        self.marks.contains(mark)
    }

    /// Length in characters, the unit selection offsets are counted in.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Paragraph,
    Code,
    Link,
}

impl BlockKind {
    pub fn name(self) -> &'static str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::Code => "code",
            BlockKind::Link => "link",
        }
    }

    /// Kinds that block toggling may switch between. Links carry a URL and
    /// are created explicitly, never by toggling.
    pub fn is_toggleable(self) -> bool {
        matches!(self, BlockKind::Paragraph | BlockKind::Code)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlockKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paragraph" => Ok(BlockKind::Paragraph),
            "code" => Ok(BlockKind::Code),
            "link" => Ok(BlockKind::Link),
            other => Err(Error::UnknownBlockKind(other.to_string())),
        }
    }
}

/// A structural node. Links keep their target in the `url` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub children: Vec<Node>,
    pub attributes: BTreeMap<String, String>,
}

impl Block {
    pub fn new(kind: BlockKind, children: Vec<Node>) -> Self {
        Block {
            kind,
            children,
            attributes: BTreeMap::new(),
        }
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Block::new(BlockKind::Paragraph, children)
    }

    pub fn code(children: Vec<Node>) -> Self {
        Block::new(BlockKind::Code, children)
    }

    pub fn link(url: impl Into<String>, children: Vec<Node>) -> Self {
        Block::new(BlockKind::Link, children).with_attribute("url", url)
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn url(&self) -> Option<&str> {
        self.attributes.get("url").map(String::as_str)
    }

    /// Text runs of this block in depth-first order, including those of nested blocks.
    pub fn runs(&self) -> Vec<&TextRun> {
        fn collect<'a>(nodes: &'a [Node], out: &mut Vec<&'a TextRun>) {
            for node in nodes {
                match node {
                    Node::Text(run) => out.push(run),
                    Node::Block(block) => collect(&block.children, out),
                }
            }
        }
        let mut out = Vec::new();
        collect(&self.children, &mut out);
        out
    }

    pub fn plain_text(&self) -> String {
        self.runs().iter().map(|run| run.text.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// Markdown rendering
// ---------------------------------------------------------------------------

/// Markdown rendering. Blocks are separated by a blank line, marks become
/// `**`, `*`, `~~` or inline `<u>`/`<mark>` tags, and links become
/// `[text](url)`. Two conversions are lossy: code blocks print their plain
/// text (marks and links inside a code block are dropped), and whitespace at
/// the edge of a marked range is moved outside the delimiters so the output
/// still parses as emphasis.
impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                write!(f, "\n\n")?;
            }
            write!(f, "{}", block)?;
        }
        Ok(())
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            BlockKind::Code => {
                writeln!(f, "```")?;
                writeln!(f, "{}", self.plain_text())?;
                write!(f, "```")
            }
            BlockKind::Link => {
                write!(f, "[")?;
                write_inline(f, &self.children)?;
                write!(f, "]({})", self.url().unwrap_or_default())
            }
            BlockKind::Paragraph => write_inline(f, &self.children),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Block(block) => write!(f, "{}", block),
            Node::Text(run) => write!(f, "{}", run),
        }
    }
}

impl fmt::Display for TextRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut inline = InlineWriter::default();
        inline.run(f, self)?;
        inline.finish(f)
    }
}

fn write_inline(f: &mut fmt::Formatter<'_>, nodes: &[Node]) -> fmt::Result {
    let mut inline = InlineWriter::default();
    for node in nodes {
        match node {
            Node::Text(run) => inline.run(f, run)?,
            Node::Block(block) => {
                inline.finish(f)?;
                write!(f, "{}", block)?;
            }
        }
    }
    inline.finish(f)
}

/// Emits a sequence of runs, opening and closing delimiters only where the
/// mark set changes. Trailing whitespace is held back until it is known
/// whether a delimiter closes after it.
#[derive(Default)]
struct InlineWriter {
    open: Vec<Mark>,
    pending: String,
}

impl InlineWriter {
    fn run(&mut self, f: &mut fmt::Formatter<'_>, run: &TextRun) -> fmt::Result {
        let body = run.text.trim_matches(char::is_whitespace);
        if body.is_empty() {
            self.pending.push_str(&run.text);
            return Ok(());
        }
        let start = run.text.len() - run.text.trim_start_matches(char::is_whitespace).len();
        let lead = &run.text[..start];
        let trail = &run.text[start + body.len()..];

        let keep = self
            .open
            .iter()
            .position(|mark| !run.marks.contains(*mark))
            .unwrap_or(self.open.len());
        self.close_to(f, keep)?;
        write_text(f, &self.pending)?;
        self.pending.clear();
        write_text(f, lead)?;

        for mark in run.marks.iter() {
            if !self.open.contains(&mark) {
                f.write_str(markdown_delimiter(mark).0)?;
                self.open.push(mark);
            }
        }
        write_text(f, body)?;
        self.pending.push_str(trail);
        Ok(())
    }

    fn finish(&mut self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.close_to(f, 0)?;
        write_text(f, &self.pending)?;
        self.pending.clear();
        Ok(())
    }

    fn close_to(&mut self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        while self.open.len() > depth {
            if let Some(mark) = self.open.pop() {
                f.write_str(markdown_delimiter(mark).1)?;
            }
        }
        Ok(())
    }
}

fn write_text(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_str(&text.replace('\n', "\\\n"))
}

fn markdown_delimiter(mark: Mark) -> (&'static str, &'static str) {
    match mark {
        Mark::Bold => ("**", "**"),
        Mark::Italic => ("*", "*"),
        Mark::Underline => ("<u>", "</u>"),
        Mark::Highlight => ("<mark>", "</mark>"),
        Mark::Strikethrough => ("~~", "~~"),
    }
}
