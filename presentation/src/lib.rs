//! Presentation layer for gemchat
//!
//! This crate contains the CLI definition, the terminal renderer that
//! observes the chat store, console formatting and the interactive REPL.

pub mod chat;
pub mod cli;
pub mod output;
pub mod render;

// Re-export commonly used types
pub use chat::{ChatRepl, ReplCommand};
pub use cli::commands::Cli;
pub use output::console::ConsoleFormatter;
pub use render::terminal::TerminalRenderer;
