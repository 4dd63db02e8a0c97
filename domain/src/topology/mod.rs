//! The logging topology descriptor.
//!
//! - [`entities`]: loggers, handlers, formatters and the [`Topology`](entities::Topology) aggregate
//! - [`name`]: hierarchical logger names
//! - [`defaults`]: the built-in descriptor
//! - [`validation`]: referential integrity and invariants
//! - [`routing`]: effective levels and handler chains

pub mod defaults;
pub mod entities;
pub mod name;
pub mod routing;
pub mod validation;
