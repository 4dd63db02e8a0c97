//! Sink adapters: console streams and size-rotated files

mod console;
mod factory;
mod rotating_file;

pub use console::ConsoleSink;
pub use factory::FsSinkFactory;
pub use rotating_file::RotatingFileSink;
#[cfg(test)]
pub(crate) use rotating_file::backup_path;
