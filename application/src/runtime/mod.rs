//! The logging runtime instantiated from a topology.
//!
//! - [`handler::Handler`]: level gate + formatter + sink
//! - [`logger::Logger`]: effective level + dispatch chain, handed to application code
//! - [`registry::LoggerRegistry`]: lookup of loggers by name

pub mod handler;
pub mod logger;
pub mod registry;
