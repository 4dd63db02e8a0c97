//! Console sink (stdout / stderr)

use logtopo_application::{Sink, SinkError};
use std::io::{self, Write};
use std::sync::Mutex;

/// Writes one line per record to a console stream
///
/// The writer sits behind a `Mutex` so lines from concurrent loggers never
/// interleave.
pub struct ConsoleSink {
    label: &'static str,
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    pub fn stdout() -> Self {
        Self::with_writer("stdout", io::stdout())
    }

    pub fn stderr() -> Self {
        Self::with_writer("stderr", io::stderr())
    }

    /// Console sink over an arbitrary writer
    pub fn with_writer(label: &'static str, writer: impl Write + Send + 'static) -> Self {
        Self {
            label,
            out: Mutex::new(Box::new(writer)),
        }
    }
}

impl Sink for ConsoleSink {
    fn write_line(&self, line: &str) -> Result<(), SinkError> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| SinkError::Poisoned(self.label.to_string()))?;
        writeln!(out, "{}", line).map_err(SinkError::Console)?;
        out.flush().map_err(SinkError::Console)
    }

    fn flush(&self) -> Result<(), SinkError> {
        self.out
            .lock()
            .map_err(|_| SinkError::Poisoned(self.label.to_string()))?
            .flush()
            .map_err(SinkError::Console)
    }

    fn describe(&self) -> String {
        self.label.to_string()
    }
}

impl std::fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
