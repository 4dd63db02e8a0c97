//! Record formatting templates.
//!
//! A formatter is a [`pattern::FormatPattern`] (which record fields appear
//! on the line, and in what order) plus a [`date::DatePattern`] (how the
//! timestamp field is rendered).

pub mod date;
pub mod pattern;
