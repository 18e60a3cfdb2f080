use std::fmt;
use std::str::FromStr;

use richtext::{BlockKind, Mark};

use crate::error::EditorError;

/// A user-level editing action, as bound to a toolbar button or shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleMark(Mark),
    ToggleBlock(BlockKind),
    Undo,
    Redo,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::ToggleMark(mark) => write!(f, "{}", mark),
            Command::ToggleBlock(kind) => write!(f, "{}", kind),
            Command::Undo => f.write_str("undo"),
            Command::Redo => f.write_str("redo"),
        }
    }
}

impl FromStr for Command {
    type Err = EditorError;

    /// Accepts a mark name, a toggleable block kind, `undo` or `redo`.
    /// Anything else is reported as an unknown mark, the namespace most
    /// commands come from.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "undo" => return Ok(Command::Undo),
            "redo" => return Ok(Command::Redo),
            _ => {}
        }
        if let Ok(mark) = s.parse::<Mark>() {
            return Ok(Command::ToggleMark(mark));
        }
        match s.parse::<BlockKind>() {
            Ok(kind) if kind.is_toggleable() => Ok(Command::ToggleBlock(kind)),
            Ok(kind) => Err(EditorError::UntoggleableBlockKind(kind)),
            Err(_) => Err(EditorError::UnknownMarkName(s.to_string())),
        }
    }
}
