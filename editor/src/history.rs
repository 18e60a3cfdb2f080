use richtext::Document;

/// A linear log of document snapshots with a cursor at the current one.
/// Recording after an undo drops the snapshots past the cursor.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<Document>,
    cursor: usize,
}

impl History {
    pub fn new(seed: Document) -> Self {
        History {
            snapshots: vec![seed],
            cursor: 0,
        }
    }

    pub fn current(&self) -> &Document {
        &self.snapshots[self.cursor]
    }

    pub fn record(&mut self, next: Document) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(next);
        self.cursor = self.snapshots.len() - 1;
    }

    /// Forget every snapshot and start over from `doc`.
    pub fn reset(&mut self, doc: Document) {
        self.snapshots = vec![doc];
        self.cursor = 0;
    }

    pub fn undo(&mut self) -> Option<&Document> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    pub fn redo(&mut self) -> Option<&Document> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Number of snapshots kept, including the current one.
    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use richtext::{Block, TextRun};

    fn doc(text: &str) -> Document {
        Document::new(vec![Block::paragraph(vec![TextRun::plain(text).into()])])
    }

    #[test]
    fn undo_redo_walk_the_log() {
        let mut history = History::new(doc("a"));
        history.record(doc("b"));
        history.record(doc("c"));

        assert_eq!(history.undo(), Some(&doc("b")));
        assert_eq!(history.undo(), Some(&doc("a")));
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), Some(&doc("b")));
        assert_eq!(history.current(), &doc("b"));
    }

    #[test]
    fn divergent_edit_truncates_redo() {
        let mut history = History::new(doc("a"));
        history.record(doc("b"));
        history.undo();
        history.record(doc("x"));

        assert!(!history.can_redo());
        assert_eq!(history.snapshot_count(), 2);
        assert_eq!(history.undo(), Some(&doc("a")));
    }
}
