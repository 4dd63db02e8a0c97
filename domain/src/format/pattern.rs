//! Line template parsing and rendering
//!
//! Patterns use brace placeholders:
//!
//! ```text
//! {timestamp} - {loggerName} - {level} - {module}:{line} - {message}
//! ```
//!
//! `{{` and `}}` produce literal braces.

use super::date::DatePattern;
use crate::core::error::DomainError;
use crate::record::entities::LogRecord;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Record field that a pattern can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Timestamp,
    LoggerName,
    Level,
    Message,
    Module,
    Line,
}

impl Field {
    /// Placeholder name as written between braces
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Timestamp => "timestamp",
            Field::LoggerName => "loggerName",
            Field::Level => "level",
            Field::Message => "message",
            Field::Module => "module",
            Field::Line => "line",
        }
    }

    fn from_placeholder(name: &str) -> Option<Self> {
        match name {
            "timestamp" => Some(Field::Timestamp),
            "loggerName" => Some(Field::LoggerName),
            "level" => Some(Field::Level),
            "message" => Some(Field::Message),
            "module" => Some(Field::Module),
            "line" => Some(Field::Line),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

/// A parsed line template (Value Object)
///
/// Keeps the source text for serialization and the parsed segments for
/// rendering.
///
/// # Example
///
/// ```
/// use logtopo_domain::{FormatPattern, Level, LogRecord, DatePattern};
///
/// let pattern: FormatPattern = "{level}: {message}".parse().unwrap();
/// let record = LogRecord::new("app", Level::Info, "ready");
/// assert_eq!(pattern.render(&record, &DatePattern::default()), "INFO: ready");
/// assert!(!pattern.has_source_location());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatPattern {
    source: String,
    segments: Vec<Segment>,
}

impl FormatPattern {
    pub fn new(source: impl Into<String>) -> Result<Self, DomainError> {
        let source = source.into();
        let segments = parse_segments(&source)?;
        Ok(Self { source, segments })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Fields referenced by this pattern, in order of appearance
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Field(field) => Some(*field),
            Segment::Literal(_) => None,
        })
    }

    pub fn references(&self, field: Field) -> bool {
        self.fields().any(|f| f == field)
    }

    /// Whether rendered lines carry the emitting module or line number
    pub fn has_source_location(&self) -> bool {
        self.references(Field::Module) || self.references(Field::Line)
    }

    /// Render a record into a single line (without trailing newline)
    pub fn render(&self, record: &LogRecord, date: &DatePattern) -> String {
        let mut line = String::with_capacity(self.source.len() + record.message.len() + 32);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => line.push_str(text),
                Segment::Field(Field::Timestamp) => line.push_str(&date.render(&record.timestamp)),
                Segment::Field(Field::LoggerName) => line.push_str(&record.logger),
                Segment::Field(Field::Level) => line.push_str(record.level.as_str()),
                Segment::Field(Field::Message) => line.push_str(&record.message),
                Segment::Field(Field::Module) => line.push_str(&record.module),
                Segment::Field(Field::Line) => line.push_str(&record.line.to_string()),
            }
        }
        line
    }
}

fn parse_segments(source: &str) -> Result<Vec<Segment>, DomainError> {
    let invalid = |reason: String| DomainError::InvalidPattern {
        pattern: source.to_string(),
        reason,
    };

    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                if !closed {
                    return Err(invalid("unclosed placeholder".to_string()));
                }
                let field = Field::from_placeholder(name.trim())
                    .ok_or_else(|| invalid(format!("unknown placeholder '{}'", name)))?;
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Field(field));
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '}' => return Err(invalid("unmatched '}'".to_string())),
            other => literal.push(other),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

impl std::fmt::Display for FormatPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for FormatPattern {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for FormatPattern {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for FormatPattern {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}
