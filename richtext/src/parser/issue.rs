use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};
use thiserror::Error;

/// Something the importer could not carry over faithfully.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IssueKind {
    #[error("document has no blocks")]
    NoBlocks,

    #[error("heading imported as a paragraph")]
    Heading,

    #[error("link without a destination imported as text")]
    EmptyLink,

    #[error("image replaced by its alt text")]
    Image,

    #[error("list items imported as paragraphs")]
    List,

    #[error("block quote imported as paragraphs")]
    BlockQuote,

    #[error("table cells imported as paragraphs")]
    Table,

    #[error("raw HTML block dropped")]
    HtmlBlock,

    #[error("inline HTML `{0}` kept as text")]
    InlineHtml(String),

    #[error("horizontal rule dropped")]
    Rule,
}

impl IssueKind {
    /// Only an import that produces no document at all is fatal.
    pub fn severity(&self) -> Severity {
        match self {
            IssueKind::NoBlocks => Severity::Error,
            _ => Severity::Warning,
        }
    }

    fn note(&self) -> Option<&'static str> {
        match self {
            IssueKind::NoBlocks => Some("an editor document needs at least one paragraph"),
            IssueKind::InlineHtml(_) => {
                Some("only <u>, <mark>, <strong>, <em> and <del> become marks")
            }
            IssueKind::Heading | IssueKind::List | IssueKind::BlockQuote | IssueKind::Table => {
                Some("the editor only knows paragraph, code and link blocks")
            }
            _ => None,
        }
    }
}

/// An import issue anchored to a byte range of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportIssue {
    pub kind: IssueKind,
    pub span: Range<usize>,
    pub file_id: usize,
}

impl ImportIssue {
    pub fn new(kind: IssueKind, span: Range<usize>, file_id: usize) -> Self {
        ImportIssue {
            kind,
            span,
            file_id,
        }
    }

    pub fn is_warning(&self) -> bool {
        self.kind.severity() == Severity::Warning
    }

    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        let diagnostic = Diagnostic::new(self.kind.severity())
            .with_message(self.kind.to_string())
            .with_labels(vec![Label::primary(self.file_id, self.span.clone())]);
        match self.kind.note() {
            Some(note) => diagnostic.with_notes(vec![note.to_string()]),
            None => diagnostic,
        }
    }
}
