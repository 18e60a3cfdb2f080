pub mod issue;
mod markdown;

pub use issue::{ImportIssue, IssueKind};

use crate::document::Document;

/// A document imported from Markdown, with any lossy-conversion warnings.
#[derive(Debug, Clone)]
pub struct Parsed {
    pub document: Document,
    pub warnings: Vec<ImportIssue>,
}

/// Markdown importer entry point.
pub struct Parser {
    source: String,
    file_id: usize,
}

impl Parser {
    pub fn new(source: String, file_id: usize) -> Self {
        Parser { source, file_id }
    }

    /// Parse the Markdown source into a document.
    pub fn parse(&self) -> Result<Parsed, Vec<ImportIssue>> {
        markdown::parse_document(&self.source, self.file_id)
    }
}
