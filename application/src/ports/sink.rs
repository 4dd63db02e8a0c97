//! Sink port
//!
//! A sink is the output side of a handler: it receives fully formatted
//! lines and writes them somewhere (console, rotating file, memory).

use logtopo_domain::HandlerSpec;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while opening or writing a sink
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Console write failed: {0}")]
    Console(#[source] std::io::Error),

    #[error("Unsupported sink for handler '{handler}': {reason}")]
    Unsupported { handler: String, reason: String },

    #[error("Sink lock poisoned: {0}")]
    Poisoned(String),
}

impl SinkError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SinkError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Destination for formatted lines
///
/// Implementations must serialize concurrent writes: each call to
/// [`write_line`](Sink::write_line) produces exactly one uninterleaved line.
pub trait Sink: Send + Sync + std::fmt::Debug {
    /// Write one line; the sink appends the line terminator
    fn write_line(&self, line: &str) -> Result<(), SinkError>;

    /// Flush buffered output
    fn flush(&self) -> Result<(), SinkError>;

    /// Human-readable destination (e.g. `stdout`, `logs/app.log`)
    fn describe(&self) -> String;
}

/// Opens the sink declared by a handler
///
/// Failures here are environment failures (permissions, missing directory,
/// disk full) and abort initialization.
pub trait SinkFactory: Send + Sync {
    fn open(&self, handler: &HandlerSpec) -> Result<Arc<dyn Sink>, SinkError>;
}
