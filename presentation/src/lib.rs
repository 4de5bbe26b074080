//! Presentation layer for switchboard
//!
//! This crate contains the CLI definitions and the formatters that render
//! envelopes, action listings and contracts.

pub mod cli;
pub mod output;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, InvokeArgs, OutputFormat};
pub use output::{ConsoleFormatter, JsonFormatter, OutputFormatter, formatter_for};
