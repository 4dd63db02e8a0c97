//! Log record entity

use super::level::Level;
use chrono::{DateTime, Local};
use std::path::Path;

/// A single log event travelling from a logger to its handlers
///
/// Carries every field a formatter can reference: timestamp, logger name,
/// level, message and the source location (module + line).
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp: DateTime<Local>,
    /// Qualified name of the logger the record was emitted on
    pub logger: String,
    pub level: Level,
    pub message: String,
    /// Source module (file stem of the emitting source file)
    pub module: String,
    pub line: u32,
}

impl LogRecord {
    /// Create a record stamped with the current local time and no source location
    pub fn new(logger: impl Into<String>, level: Level, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            logger: logger.into(),
            level,
            message: message.into(),
            module: String::new(),
            line: 0,
        }
    }

    pub fn with_location(mut self, module: impl Into<String>, line: u32) -> Self {
        self.module = module.into();
        self.line = line;
        self
    }

    /// Set the source location from a file path (`src/routes/api.rs` -> `api`)
    pub fn with_source_file(self, file: &str, line: u32) -> Self {
        let module = module_from_path(file);
        self.with_location(module, line)
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Derive a module name from a source file path: the file stem.
///
/// Falls back to the input when it has no stem (e.g. an empty string).
pub fn module_from_path(file: &str) -> String {
    Path::new(file)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file)
        .to_string()
}
