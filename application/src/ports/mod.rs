//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod descriptor_source;
pub mod error_reporter;
pub mod sink;
