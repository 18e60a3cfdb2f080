pub mod command;
pub mod commands;
pub mod config;
pub mod error;
pub mod history;
pub mod session;

pub use command::Command;
pub use commands::{
    active_marks, is_block_active, is_mark_active, toggle_block_type, toggle_mark,
    toggle_mark_with,
};
pub use config::{EditorConfig, MixedSelectionPolicy};
pub use error::{EditorError, Result};
pub use history::History;
pub use session::{ChangeSink, Editor};
