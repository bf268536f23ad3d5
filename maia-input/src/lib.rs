//! Vim-style modal keyboard input handling for MAIA

mod commands;
mod modal;

pub use commands::{parse_command, parse_time, Command, CommandError};
pub use modal::{InputHandler, Mode};
