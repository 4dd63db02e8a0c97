//! In-memory sinks for unit tests.

use crate::ports::sink::{Sink, SinkError, SinkFactory};
use logtopo_domain::HandlerSpec;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Captures lines in memory; optionally fails every write
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
    fail: bool,
}

impl MemorySink {
    pub fn failing() -> Self {
        Self {
            lines: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl Sink for MemorySink {
    fn write_line(&self, line: &str) -> Result<(), SinkError> {
        if self.fail {
            return Err(SinkError::Console(std::io::Error::other("broken pipe")));
        }
        self.lines.lock().unwrap().push(line.to_string());
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Hands out one [`MemorySink`] per handler name and keeps them for inspection
#[derive(Debug, Default)]
pub struct MemorySinkFactory {
    sinks: Mutex<HashMap<String, Arc<MemorySink>>>,
    refuse: Option<String>,
}

impl MemorySinkFactory {
    /// A factory that cannot open the sink of `handler`
    pub fn refusing(handler: &str) -> Self {
        Self {
            sinks: Mutex::new(HashMap::new()),
            refuse: Some(handler.to_string()),
        }
    }

    pub fn lines(&self, handler: &str) -> Vec<String> {
        self.sinks
            .lock()
            .unwrap()
            .get(handler)
            .map(|s| s.lines())
            .unwrap_or_default()
    }
}

impl SinkFactory for MemorySinkFactory {
    fn open(&self, handler: &HandlerSpec) -> Result<Arc<dyn Sink>, SinkError> {
        if self.refuse.as_deref() == Some(handler.name.as_str()) {
            return Err(SinkError::io(
                "logs/app.log",
                std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            ));
        }
        let sink = Arc::new(MemorySink::default());
        self.sinks
            .lock()
            .unwrap()
            .insert(handler.name.clone(), sink.clone());
        Ok(sink)
    }
}
