//! Domain layer for logtopo
//!
//! This crate contains the logging topology model: levels, records, format
//! patterns and the descriptor that binds loggers to handlers and handlers
//! to formatters. It has no dependencies on I/O or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Topology
//!
//! A [`Topology`] declares three kinds of named entities:
//!
//! - **Logger**: entry point for records, gated by a minimum [`Level`]
//! - **Handler**: destination (console or rotating file), gated by its own level
//! - **Formatter**: template turning a [`LogRecord`] into one line
//!
//! ## Routing
//!
//! A record at level `S` on logger `L` reaches handler `H` iff
//! `S >= L.level` and `S >= H.level`, where `H` is bound to `L` or to an
//! ancestor reached through propagation. See [`topology::routing`].

pub mod core;
pub mod format;
pub mod record;
pub mod topology;

// Re-export commonly used types
pub use core::error::DomainError;
pub use format::{
    date::{DEFAULT_DATE_FORMAT, DatePattern},
    pattern::{Field, FormatPattern},
};
pub use record::{
    entities::{LogRecord, module_from_path},
    level::Level,
};
pub use topology::{
    entities::{
        FileMode, FormatterSpec, HandlerSpec, LoggerSpec, RotatingFileSpec, SinkSpec, Topology,
        UTF8_ENCODING,
    },
    name::{LoggerName, ROOT_LOGGER},
    routing::{FALLBACK_LEVEL, ResolvedLogger},
    validation::{Severity, TopologyIssue, TopologyIssueCode},
};
