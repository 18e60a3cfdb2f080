use std::fmt;

use thiserror::Error;

use crate::document::{Block, BlockKind, Document, Node};

/// Location of a node as child indices from the document root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePath(pub Vec<usize>);

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "[{}]", parts.join("."))
    }
}

/// The first structural invariant a document was found to break.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("document has no blocks")]
    EmptyDocument,

    #[error("block at {path} has no children")]
    EmptyBlock { path: NodePath },

    #[error("link at {path} has no url")]
    MissingLinkUrl { path: NodePath },

    #[error("link at {path} contains a nested block")]
    BlockInsideLink { path: NodePath },

    #[error("{kind} block at {path} carries unexpected attribute `{name}`")]
    UnexpectedAttribute {
        path: NodePath,
        kind: BlockKind,
        name: String,
    },
}

/// Check every structural invariant of `doc`, reporting the first violation
/// in document order.
pub fn validate(doc: &Document) -> Result<(), Violation> {
    if doc.blocks.is_empty() {
        return Err(Violation::EmptyDocument);
    }
    let mut path = Vec::new();
    for (i, block) in doc.blocks.iter().enumerate() {
        path.push(i);
        validate_block(block, &mut path)?;
        path.pop();
    }
    Ok(())
}

pub fn is_valid(doc: &Document) -> bool {
    validate(doc).is_ok()
}

fn validate_block(block: &Block, path: &mut Vec<usize>) -> Result<(), Violation> {
    if block.children.is_empty() {
        return Err(Violation::EmptyBlock {
            path: NodePath(path.clone()),
        });
    }

    match block.kind {
        BlockKind::Link => {
            if block.url().is_none_or(str::is_empty) {
                return Err(Violation::MissingLinkUrl {
                    path: NodePath(path.clone()),
                });
            }
            if let Some(i) = block
                .children
                .iter()
                .position(|child| matches!(child, Node::Block(_)))
            {
                let mut child_path = path.clone();
                child_path.push(i);
                return Err(Violation::BlockInsideLink {
                    path: NodePath(child_path),
                });
            }
        }
        BlockKind::Paragraph | BlockKind::Code => {
            if let Some(name) = block.attributes.keys().next() {
                return Err(Violation::UnexpectedAttribute {
                    path: NodePath(path.clone()),
                    kind: block.kind,
                    name: name.clone(),
                });
            }
        }
    }

    for (i, child) in block.children.iter().enumerate() {
        if let Node::Block(inner) = child {
            path.push(i);
            validate_block(inner, path)?;
            path.pop();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextRun;

    #[test]
    fn seed_is_valid() {
        assert!(is_valid(&Document::seed()));
    }

    #[test]
    fn empty_document_is_rejected() {
        assert_eq!(validate(&Document::new(vec![])), Err(Violation::EmptyDocument));
    }

    #[test]
    fn empty_nested_block_reports_its_path() {
        let doc = Document::new(vec![
            Block::paragraph(vec![TextRun::plain("ok").into()]),
            Block::paragraph(vec![
                TextRun::plain("a").into(),
                Block::link("https://x.test", vec![]).into(),
            ]),
        ]);
        assert_eq!(
            validate(&doc),
            Err(Violation::EmptyBlock {
                path: NodePath(vec![1, 1])
            })
        );
    }

    #[test]
    fn link_rules() {
        let no_url = Document::new(vec![Block::paragraph(vec![
            Block::link("", vec![TextRun::plain("x").into()]).into(),
        ])]);
        assert!(matches!(validate(&no_url), Err(Violation::MissingLinkUrl { .. })));

        let nested = Document::new(vec![Block::link(
            "https://x.test",
            vec![Block::paragraph(vec![TextRun::plain("x").into()]).into()],
        )]);
        assert_eq!(
            validate(&nested),
            Err(Violation::BlockInsideLink {
                path: NodePath(vec![0, 0])
            })
        );
    }

    #[test]
    fn attributes_only_on_links() {
        let doc = Document::new(vec![
            Block::code(vec![TextRun::plain("x").into()]).with_attribute("url", "https://x.test"),
        ]);
        let err = validate(&doc).unwrap_err();
        assert_eq!(
            err.to_string(),
            "code block at [0] carries unexpected attribute `url`"
        );
    }
}
