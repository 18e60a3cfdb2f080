use thiserror::Error;

/// Errors raised while interpreting identifiers and selections handed in by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("unknown mark name: {0}")]
    UnknownMarkName(String),

    #[error("unknown block kind: {0}")]
    UnknownBlockKind(String),

    #[error("invalid selection: {0}")]
    InvalidSelection(String),
}

pub type Result<T> = std::result::Result<T, Error>;
