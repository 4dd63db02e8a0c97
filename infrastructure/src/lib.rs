//! Infrastructure layer for logtopo
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: descriptor files and their layered loading,
//! console and rotating-file sinks, and the `tracing` bridge.

pub mod descriptor;
pub mod logging;
pub mod sinks;

// Re-export commonly used types
pub use descriptor::{
    ConfError, ConfErrorKind, ConfigSource, ConversionError, DescriptorLoader, FileTopology,
    LoadError, SourceKind, parse_conf, parse_toml, to_conf_string, to_toml_string,
};
pub use logging::{StderrReporter, TopologyLayer, map_level};
pub use sinks::{ConsoleSink, FsSinkFactory, RotatingFileSink};
