//! Logging adapters: the `tracing` bridge and the sink error reporter.

mod layer;
mod stderr_reporter;

pub use layer::{TopologyLayer, map_level};
pub use stderr_reporter::StderrReporter;
