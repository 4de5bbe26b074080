//! Envelope and catalog rendering

pub mod console;
pub mod formatter;

pub use console::ConsoleFormatter;
pub use formatter::{JsonFormatter, OutputFormatter, formatter_for};
