pub mod document;
pub mod error;
pub mod parser;
pub mod selection;
pub mod serialize;
pub mod walk;

pub use document::mark::{Mark, MarkSet};
pub use document::validate::{NodePath, Violation, is_valid, validate};
pub use document::{Block, BlockKind, Document, Node, TextRun};
pub use error::{Error, Result};
pub use selection::{Point, Selection};
pub use serialize::{escape_html, serialize};
