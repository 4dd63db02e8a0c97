//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: domain-level errors raised while parsing values

pub mod error;
