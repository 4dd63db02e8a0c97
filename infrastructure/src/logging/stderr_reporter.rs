//! Reports sink failures on stderr

use logtopo_application::{ErrorReporter, SinkError};
use logtopo_domain::LogRecord;
use std::error::Error as _;
use std::io::{self, Write};
use std::sync::Mutex;

/// Writes a short report for every failed handler write
///
/// Uses the raw stream rather than `tracing`, so a failure inside a handler
/// can never feed back into the topology it came from.
pub struct StderrReporter {
    out: Mutex<Box<dyn Write + Send>>,
}

impl Default for StderrReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl StderrReporter {
    pub fn new() -> Self {
        Self::with_writer(io::stderr())
    }

    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(writer)),
        }
    }
}

fn describe(error: &SinkError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

impl ErrorReporter for StderrReporter {
    fn report(&self, handler: &str, record: &LogRecord, error: &SinkError) {
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        let _ = writeln!(
            out,
            "--- Logging error ---\nhandler '{}' dropped a {} record from '{}' ({}:{}): {}",
            handler,
            record.level,
            record.logger,
            record.module,
            record.line,
            describe(error)
        );
        let _ = out.flush();
    }
}
