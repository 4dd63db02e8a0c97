//! Application layer for logtopo
//!
//! This crate contains the logging runtime, the use case that builds it from
//! a topology descriptor, and the port definitions infrastructure adapters
//! implement (sinks, descriptor sources, error reporting).
//! It depends only on the domain layer.

pub mod ports;
pub mod runtime;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use ports::{
    descriptor_source::{DescriptorError, DescriptorSource, StaticDescriptor},
    error_reporter::{ErrorReporter, NoErrorReporter},
    sink::{Sink, SinkError, SinkFactory},
};
pub use runtime::{handler::Handler, logger::Logger, registry::LoggerRegistry};
pub use use_cases::init_logging::{InitLoggingError, InitLoggingUseCase};
