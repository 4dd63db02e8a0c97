//! Live handler: a level gate, a formatter and an open sink.

use crate::ports::sink::{Sink, SinkError};
use logtopo_domain::{FormatterSpec, Level, LogRecord};
use std::sync::Arc;

/// A handler instantiated from a [`HandlerSpec`](logtopo_domain::HandlerSpec)
pub struct Handler {
    name: String,
    level: Level,
    formatter: Arc<FormatterSpec>,
    sink: Arc<dyn Sink>,
}

impl Handler {
    pub fn new(
        name: impl Into<String>,
        level: Level,
        formatter: Arc<FormatterSpec>,
        sink: Arc<dyn Sink>,
    ) -> Self {
        Self {
            name: name.into(),
            level,
            formatter,
            sink,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn formatter(&self) -> &FormatterSpec {
        &self.formatter
    }

    pub fn destination(&self) -> String {
        self.sink.describe()
    }

    /// Format and write the record if it passes this handler's level.
    ///
    /// Returns `Ok(false)` when the record was filtered out.
    pub fn handle(&self, record: &LogRecord) -> Result<bool, SinkError> {
        if !record.level.passes(self.level) {
            return Ok(false);
        }
        let line = self.formatter.format(record);
        self.sink.write_line(&line)?;
        Ok(true)
    }

    pub fn flush(&self) -> Result<(), SinkError> {
        self.sink.flush()
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("level", &self.level)
            .field("formatter", &self.formatter.name)
            .field("sink", &self.sink.describe())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemorySink;
    use logtopo_domain::FormatPattern;

    fn handler(level: Level, sink: Arc<MemorySink>) -> Handler {
        let formatter = FormatterSpec::new("plain", FormatPattern::new("{level} {message}").unwrap());
        Handler::new("memory", level, Arc::new(formatter), sink)
    }

    #[test]
    fn test_writes_records_at_or_above_level() {
        let sink = Arc::new(MemorySink::default());
        let handler = handler(Level::Warning, sink.clone());

        assert!(handler.handle(&LogRecord::new("app", Level::Warning, "low disk")).unwrap());
        assert!(handler.handle(&LogRecord::new("app", Level::Critical, "no disk")).unwrap());
        assert!(!handler.handle(&LogRecord::new("app", Level::Info, "fine")).unwrap());

        assert_eq!(sink.lines(), vec!["WARNING low disk", "CRITICAL no disk"]);
    }

    #[test]
    fn test_propagates_sink_failure() {
        let sink = Arc::new(MemorySink::failing());
        let handler = handler(Level::Debug, sink);
        let result = handler.handle(&LogRecord::new("app", Level::Error, "boom"));
        assert!(matches!(result, Err(SinkError::Console(_))));
    }

    #[test]
    fn test_debug_shows_destination() {
        let handler = handler(Level::Info, Arc::new(MemorySink::default()));
        let rendered = format!("{:?}", handler);
        assert!(rendered.contains("memory"));
        assert!(rendered.contains("plain"));
    }
}
