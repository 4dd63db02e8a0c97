//! Topology entities: loggers, handlers, formatters and the descriptor that
//! binds them together.

use super::name::LoggerName;
use crate::core::error::DomainError;
use crate::format::date::DatePattern;
use crate::format::pattern::FormatPattern;
use crate::record::entities::LogRecord;
use crate::record::level::Level;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Encoding every file sink writes
pub const UTF8_ENCODING: &str = "utf-8";

/// A named entry point for records, gated by a minimum level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSpec {
    /// Section key in the descriptor file (usually equal to the name)
    pub key: String,
    pub name: LoggerName,
    pub level: Level,
    /// Bound handler names, in dispatch order
    pub handlers: Vec<String>,
    /// Whether records continue to the ancestors' handlers
    pub propagate: bool,
}

impl LoggerSpec {
    /// Create a propagating logger with no handlers; `root` never propagates
    pub fn new(name: LoggerName, level: Level) -> Self {
        Self {
            key: name.to_string(),
            propagate: !name.is_root(),
            name,
            level,
            handlers: Vec::new(),
        }
    }

    pub fn root(level: Level) -> Self {
        Self::new(LoggerName::root(), level)
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_handler(mut self, handler: impl Into<String>) -> Self {
        self.handlers.push(handler.into());
        self
    }

    pub fn with_handlers<I, S>(mut self, handlers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.handlers.extend(handlers.into_iter().map(Into::into));
        self
    }

    pub fn with_propagate(mut self, propagate: bool) -> Self {
        self.propagate = propagate;
        self
    }

    pub fn is_root(&self) -> bool {
        self.name.is_root()
    }

    pub fn binds(&self, handler: &str) -> bool {
        self.handlers.iter().any(|h| h == handler)
    }
}

/// How a rotating file is opened at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileMode {
    /// Keep existing content and append (default)
    #[default]
    Append,
    /// Truncate on open
    Write,
}

impl FileMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileMode::Append => "append",
            FileMode::Write => "write",
        }
    }
}

impl std::fmt::Display for FileMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FileMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "append" | "a" => Ok(FileMode::Append),
            "write" | "w" => Ok(FileMode::Write),
            _ => Err(DomainError::UnknownFileMode(s.trim().to_string())),
        }
    }
}

/// Size-rotated file destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotatingFileSpec {
    pub path: PathBuf,
    pub mode: FileMode,
    /// Rotation threshold in bytes; `0` disables rotation
    pub max_bytes: u64,
    /// Number of rotated files kept next to the active one
    pub backup_count: u32,
    pub encoding: String,
}

impl RotatingFileSpec {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: FileMode::Append,
            max_bytes: 0,
            backup_count: 0,
            encoding: UTF8_ENCODING.to_string(),
        }
    }

    pub fn with_mode(mut self, mode: FileMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_rotation(mut self, max_bytes: u64, backup_count: u32) -> Self {
        self.max_bytes = max_bytes;
        self.backup_count = backup_count;
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    pub fn rotates(&self) -> bool {
        self.max_bytes > 0
    }

    pub fn is_utf8(&self) -> bool {
        matches!(
            self.encoding.trim().to_ascii_lowercase().as_str(),
            "utf-8" | "utf8"
        )
    }
}

/// Where a handler writes its lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SinkSpec {
    Stdout,
    Stderr,
    RotatingFile(RotatingFileSpec),
}

impl SinkSpec {
    /// Kind name as written in descriptor files
    pub fn kind(&self) -> &'static str {
        match self {
            SinkSpec::Stdout => "stdout",
            SinkSpec::Stderr => "stderr",
            SinkSpec::RotatingFile(_) => "rotating_file",
        }
    }

    pub fn is_console(&self) -> bool {
        matches!(self, SinkSpec::Stdout | SinkSpec::Stderr)
    }
}

/// A destination for records at or above its own level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerSpec {
    pub name: String,
    pub level: Level,
    /// Name of the formatter that renders this handler's lines
    pub formatter: String,
    pub sink: SinkSpec,
}

impl HandlerSpec {
    pub fn new(
        name: impl Into<String>,
        level: Level,
        formatter: impl Into<String>,
        sink: SinkSpec,
    ) -> Self {
        Self {
            name: name.into(),
            level,
            formatter: formatter.into(),
            sink,
        }
    }

    pub fn accepts(&self, level: Level) -> bool {
        level.passes(self.level)
    }
}

/// A line template plus its timestamp pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatterSpec {
    pub name: String,
    pub pattern: FormatPattern,
    pub date_format: DatePattern,
}

impl FormatterSpec {
    pub fn new(name: impl Into<String>, pattern: FormatPattern) -> Self {
        Self {
            name: name.into(),
            pattern,
            date_format: DatePattern::default(),
        }
    }

    pub fn with_date_format(mut self, date_format: DatePattern) -> Self {
        self.date_format = date_format;
        self
    }

    /// Render one record as a single output line
    pub fn format(&self, record: &LogRecord) -> String {
        self.pattern.render(record, &self.date_format)
    }
}

/// The complete logging topology descriptor (Aggregate)
///
/// Declares every logger, handler and formatter, in declaration order.
/// Cross references (logger → handler, handler → formatter) are by name and
/// checked by [`Topology::validate`](crate::topology::validation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub loggers: Vec<LoggerSpec>,
    pub handlers: Vec<HandlerSpec>,
    pub formatters: Vec<FormatterSpec>,
}

impl Topology {
    pub fn empty() -> Self {
        Self {
            loggers: Vec::new(),
            handlers: Vec::new(),
            formatters: Vec::new(),
        }
    }

    pub fn logger(&self, name: &str) -> Option<&LoggerSpec> {
        self.loggers.iter().find(|l| l.name.as_str() == name)
    }

    pub fn root(&self) -> Option<&LoggerSpec> {
        self.loggers.iter().find(|l| l.is_root())
    }

    pub fn handler(&self, name: &str) -> Option<&HandlerSpec> {
        self.handlers.iter().find(|h| h.name == name)
    }

    pub fn formatter(&self, name: &str) -> Option<&FormatterSpec> {
        self.formatters.iter().find(|f| f.name == name)
    }

    /// Handlers whose sink is a file
    pub fn file_handlers(&self) -> impl Iterator<Item = (&HandlerSpec, &RotatingFileSpec)> {
        self.handlers.iter().filter_map(|h| match &h.sink {
            SinkSpec::RotatingFile(file) => Some((h, file)),
            _ => None,
        })
    }

    /// Ordering-independent form: `root` first, then by name
    ///
    /// Two descriptors that declare the same entities in a different order
    /// normalize to equal values.
    pub fn normalized(&self) -> Self {
        let mut normalized = self.clone();
        normalized
            .loggers
            .sort_by(|a, b| (!a.is_root(), &a.name).cmp(&(!b.is_root(), &b.name)));
        normalized.handlers.sort_by(|a, b| a.name.cmp(&b.name));
        normalized.formatters.sort_by(|a, b| a.name.cmp(&b.name));
        normalized
    }

    /// Check that two descriptors declare the same topology, ignoring order
    pub fn is_equivalent(&self, other: &Topology) -> bool {
        self.normalized() == other.normalized()
    }
}
