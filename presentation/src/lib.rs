//! Presentation layer for logtopo
//!
//! This crate contains the CLI definitions and console formatters.

pub mod cli;
pub mod output;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, ShowFormat};
pub use output::console::TopologyFormatter;
