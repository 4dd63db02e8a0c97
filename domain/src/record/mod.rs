//! Log records and severity levels.
//!
//! - [`level::Level`]: the fixed, ordered severity scale
//! - [`entities::LogRecord`]: one emitted event, as seen by handlers and formatters

pub mod entities;
pub mod level;
