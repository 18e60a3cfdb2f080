use richtext::{BlockKind, Violation};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("invalid document state: {0}")]
    InvalidDocumentState(#[from] Violation),

    #[error("unknown mark name: {0}")]
    UnknownMarkName(String),

    #[error("unknown block kind: {0}")]
    UnknownBlockKind(String),

    #[error("block kind `{0}` cannot be toggled")]
    UntoggleableBlockKind(BlockKind),

    #[error("invalid selection: {0}")]
    InvalidSelection(String),
}

impl From<richtext::Error> for EditorError {
    fn from(error: richtext::Error) -> Self {
        match error {
            richtext::Error::UnknownMarkName(name) => EditorError::UnknownMarkName(name),
            richtext::Error::UnknownBlockKind(name) => EditorError::UnknownBlockKind(name),
            richtext::Error::InvalidSelection(text) => EditorError::InvalidSelection(text),
        }
    }
}

pub type Result<T> = std::result::Result<T, EditorError>;
