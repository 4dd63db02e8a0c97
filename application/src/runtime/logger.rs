//! Logger handle exposed to application code.

use super::handler::Handler;
use crate::ports::error_reporter::ErrorReporter;
use logtopo_domain::{Level, LogRecord, LoggerName};
use std::panic::Location;
use std::sync::Arc;

/// A resolved, cheaply cloneable logger
///
/// Holds the logger's effective level and its full dispatch chain (own
/// handlers, then propagated ancestors' handlers), so emitting a record
/// needs no lookups.
#[derive(Clone)]
pub struct Logger {
    name: LoggerName,
    effective_level: Level,
    chain: Arc<[Arc<Handler>]>,
    reporter: Arc<dyn ErrorReporter>,
}

impl Logger {
    pub(crate) fn new(
        name: LoggerName,
        effective_level: Level,
        chain: Vec<Arc<Handler>>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            name,
            effective_level,
            chain: chain.into(),
            reporter,
        }
    }

    pub fn name(&self) -> &LoggerName {
        &self.name
    }

    pub fn effective_level(&self) -> Level {
        self.effective_level
    }

    /// Names of the handlers in dispatch order
    pub fn handler_names(&self) -> Vec<&str> {
        self.chain.iter().map(|h| h.name()).collect()
    }

    pub fn is_enabled_for(&self, level: Level) -> bool {
        level.passes(self.effective_level)
    }

    /// Emit a message, recording the caller's source file and line
    #[track_caller]
    pub fn log(&self, level: Level, message: impl Into<String>) {
        if !self.is_enabled_for(level) {
            return;
        }
        let caller = Location::caller();
        let record = LogRecord::new(self.name.as_str(), level, message)
            .with_source_file(caller.file(), caller.line());
        self.dispatch(&record);
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::Debug, message);
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::Info, message);
    }

    #[track_caller]
    pub fn warning(&self, message: impl Into<String>) {
        self.log(Level::Warning, message);
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::Error, message);
    }

    #[track_caller]
    pub fn critical(&self, message: impl Into<String>) {
        self.log(Level::Critical, message);
    }

    /// Dispatch a prepared record through the level gate and handler chain.
    ///
    /// Returns the number of handlers that wrote the record. The record's
    /// `logger` field is left as provided.
    pub fn log_record(&self, record: &LogRecord) -> usize {
        if !self.is_enabled_for(record.level) {
            return 0;
        }
        self.dispatch(record)
    }

    fn dispatch(&self, record: &LogRecord) -> usize {
        let mut written = 0;
        for handler in self.chain.iter() {
            match handler.handle(record) {
                Ok(true) => written += 1,
                Ok(false) => {}
                Err(e) => self.reporter.report(handler.name(), record, &e),
            }
        }
        written
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("effective_level", &self.effective_level)
            .field("handlers", &self.handler_names())
            .finish()
    }
}
