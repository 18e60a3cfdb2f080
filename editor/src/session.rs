use richtext::{BlockKind, Document, Mark, MarkSet, Selection, serialize, validate};
use tracing::debug;

use crate::command::Command;
use crate::commands;
use crate::config::EditorConfig;
use crate::error::Result;
use crate::history::History;

/// Receives the serialized HTML every time the session's document changes.
pub trait ChangeSink {
    fn changed(&mut self, html: &str);
}

impl<F> ChangeSink for F
where
    F: FnMut(&str),
{
    fn changed(&mut self, html: &str) {
        self(html)
    }
}

/// An editing session: the current document, its snapshot history and the
/// sinks to notify on change. Selections are supplied by the caller on every
/// call and never stored.
pub struct Editor {
    config: EditorConfig,
    history: History,
    sinks: Vec<Box<dyn ChangeSink>>,
}

impl Editor {
    /// A session seeded with the default two-paragraph document.
    pub fn new(config: EditorConfig) -> Self {
        Editor {
            config,
            history: History::new(Document::seed()),
            sinks: Vec::new(),
        }
    }

    pub fn with_document(doc: Document, config: EditorConfig) -> Result<Self> {
        validate(&doc)?;
        Ok(Editor {
            config,
            history: History::new(doc),
            sinks: Vec::new(),
        })
    }

    pub fn document(&self) -> &Document {
        self.history.current()
    }

    pub fn html(&self) -> String {
        serialize(self.document())
    }

    pub fn on_change(&mut self, sink: impl ChangeSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    /// Run a command. Returns whether the document changed.
    pub fn apply(&mut self, sel: &Selection, command: Command) -> Result<bool> {
        match command {
            Command::ToggleMark(mark) => self.toggle_mark(sel, mark),
            Command::ToggleBlock(kind) => self.toggle_block_type(sel, kind),
            Command::Undo => Ok(self.undo()),
            Command::Redo => Ok(self.redo()),
        }
    }

    pub fn toggle_mark(&mut self, sel: &Selection, mark: Mark) -> Result<bool> {
        let next =
            commands::toggle_mark_with(self.document(), sel, mark, self.config.mixed_selection)?;
        Ok(self.commit(next))
    }

    pub fn toggle_block_type(&mut self, sel: &Selection, kind: BlockKind) -> Result<bool> {
        let next = commands::toggle_block_type(self.document(), sel, kind)?;
        Ok(self.commit(next))
    }

    pub fn undo(&mut self) -> bool {
        if self.history.undo().is_none() {
            return false;
        }
        debug!(cursor = self.history.cursor(), "undo");
        self.notify();
        true
    }

    pub fn redo(&mut self) -> bool {
        if self.history.redo().is_none() {
            return false;
        }
        debug!(cursor = self.history.cursor(), "redo");
        self.notify();
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn is_mark_active(&self, sel: &Selection, mark: Mark) -> bool {
        commands::is_mark_active(self.document(), sel, mark)
    }

    pub fn is_block_active(&self, sel: &Selection, kind: BlockKind) -> bool {
        commands::is_block_active(self.document(), sel, kind)
    }

    pub fn active_marks(&self, sel: &Selection) -> MarkSet {
        commands::active_marks(self.document(), sel)
    }

    fn commit(&mut self, next: Document) -> bool {
        if next == *self.document() {
            return false;
        }
        if self.config.history {
            self.history.record(next);
        } else {
            self.history.reset(next);
        }
        self.notify();
        true
    }

    fn notify(&mut self) {
        let html = serialize(self.history.current());
        for sink in &mut self.sinks {
            sink.changed(&html);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use richtext::Point;

    fn recorder(editor: &mut Editor) -> Rc<RefCell<Vec<String>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        editor.on_change(move |html: &str| sink.borrow_mut().push(html.to_string()));
        seen
    }

    #[test]
    fn sink_sees_changes_but_not_noops() {
        let mut editor = Editor::new(EditorConfig::default());
        let seen = recorder(&mut editor);

        let sel = Selection::collapsed(Point::new(0, 0, 3));
        assert!(editor.toggle_mark(&sel, Mark::Bold).unwrap());
        assert!(!editor.toggle_mark(&Selection::collapsed(Point::new(5, 0, 0)), Mark::Bold).unwrap());
        assert!(editor.undo());
        assert!(editor.redo());

        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        assert!(seen[0].starts_with("<p><strong>A line of text"));
        assert!(seen[1].starts_with("<p>A line of text"));
        assert_eq!(seen[2], seen[0]);
    }

    #[test]
    fn disabled_history_keeps_no_snapshots() {
        let config = EditorConfig {
            history: false,
            ..EditorConfig::default()
        };
        let mut editor = Editor::new(config);
        let sel = Selection::collapsed(Point::default());
        editor.toggle_block_type(&sel, BlockKind::Code).unwrap();
        assert!(!editor.can_undo());
        assert!(!editor.undo());
        assert!(editor.is_block_active(&sel, BlockKind::Code));
    }

    #[test]
    fn invalid_seed_is_rejected() {
        let result = Editor::with_document(Document::new(vec![]), EditorConfig::default());
        assert!(result.is_err());
    }
}
