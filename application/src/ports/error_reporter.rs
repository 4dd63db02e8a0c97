//! Port for reporting sink failures that happen after startup.
//!
//! Once the topology is live, a failed write must not interrupt the
//! emitting code or the other handlers. The failure is handed to an
//! [`ErrorReporter`] instead.

use super::sink::SinkError;
use logtopo_domain::LogRecord;

/// Receives write failures from handlers
pub trait ErrorReporter: Send + Sync {
    fn report(&self, handler: &str, record: &LogRecord, error: &SinkError);
}

/// No-op implementation for tests and when failures should be dropped.
pub struct NoErrorReporter;

impl ErrorReporter for NoErrorReporter {
    fn report(&self, _handler: &str, _record: &LogRecord, _error: &SinkError) {}
}
