//! `.conf` descriptor format
//!
//! A key-grouped text file: `[section]` headers followed by `key=value`
//! lines. Three index sections name the members; each member has its own
//! section carrying its properties.
//!
//! ```text
//! [loggers]
//! keys=root,app
//!
//! [handlers]
//! keys=consoleHandler
//!
//! [formatters]
//! keys=standardFormatter
//!
//! [logger_root]
//! level=WARNING
//! handlers=consoleHandler
//!
//! [logger_app]
//! level=INFO
//! handlers=consoleHandler
//! qualname=app
//! propagate=0
//!
//! [handler_consoleHandler]
//! sink=stdout
//! level=INFO
//! formatter=standardFormatter
//!
//! [formatter_standardFormatter]
//! format={timestamp} - {loggerName} - {level} - {message}
//! datefmt=%Y-%m-%d %H:%M:%S
//! ```
//!
//! Lines starting with `#` or `;` are comments. Keys are case-insensitive;
//! values are trimmed and taken verbatim otherwise. A value wrapped in one
//! pair of double quotes keeps its edge whitespace: `format="{message}  "`.

use logtopo_domain::{
    DatePattern, DomainError, FileMode, FormatPattern, FormatterSpec, HandlerSpec, Level, LoggerName,
    LoggerSpec, ROOT_LOGGER, RotatingFileSpec, SinkSpec, Topology, UTF8_ENCODING,
};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Write as _;
use thiserror::Error;

const LOGGERS: &str = "loggers";
const HANDLERS: &str = "handlers";
const FORMATTERS: &str = "formatters";
const LOGGER_PREFIX: &str = "logger_";
const HANDLER_PREFIX: &str = "handler_";
const FORMATTER_PREFIX: &str = "formatter_";

const LOGGER_KEYS: &[&str] = &["level", "handlers", "propagate", "qualname"];
const CONSOLE_HANDLER_KEYS: &[&str] = &["sink", "level", "formatter"];
const FILE_HANDLER_KEYS: &[&str] = &[
    "sink",
    "level",
    "formatter",
    "path",
    "mode",
    "max_bytes",
    "backup_count",
    "encoding",
];
const FORMATTER_KEYS: &[&str] = &["format", "datefmt"];

/// A syntax or schema error in a `.conf` descriptor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}{kind}", location(.line))]
pub struct ConfError {
    /// 1-based line number, when the error is tied to a line
    pub line: Option<usize>,
    pub kind: ConfErrorKind,
}

fn location(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!("line {}: ", line),
        None => String::new(),
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfErrorKind {
    #[error("expected '[section]' or 'key=value', found {0:?}")]
    Syntax(String),

    #[error("key {0:?} appears before any section")]
    KeyOutsideSection(String),

    #[error("duplicate section [{0}]")]
    DuplicateSection(String),

    #[error("duplicate key {key:?} in [{section}]")]
    DuplicateKey { section: String, key: String },

    #[error("missing section [{0}]")]
    MissingSection(String),

    #[error("section [{0}] is not declared in its keys list")]
    UndeclaredSection(String),

    #[error("unknown section [{0}]")]
    UnknownSection(String),

    #[error("unknown key {key:?} in [{section}]")]
    UnknownKey { section: String, key: String },

    #[error("missing key {key:?} in [{section}]")]
    MissingKey { section: String, key: String },

    #[error("invalid value for {key:?} in [{section}]: {reason}")]
    InvalidValue {
        section: String,
        key: String,
        reason: String,
    },
}

impl ConfError {
    fn at(line: usize, kind: ConfErrorKind) -> Self {
        Self {
            line: Some(line),
            kind,
        }
    }

    fn unplaced(kind: ConfErrorKind) -> Self {
        Self { line: None, kind }
    }
}

// ==================== Lexing ====================

#[derive(Debug)]
struct Entry {
    value: String,
    line: usize,
}

#[derive(Debug)]
struct Section {
    name: String,
    line: usize,
    entries: HashMap<String, Entry>,
}

impl Section {
    fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    fn require(&self, key: &str) -> Result<&Entry, ConfError> {
        self.get(key).ok_or_else(|| {
            ConfError::at(
                self.line,
                ConfErrorKind::MissingKey {
                    section: self.name.clone(),
                    key: key.to_string(),
                },
            )
        })
    }

    fn check_keys(&self, allowed: &[&str]) -> Result<(), ConfError> {
        let mut unknown: Vec<(&String, &Entry)> = self
            .entries
            .iter()
            .filter(|(key, _)| !allowed.contains(&key.as_str()))
            .collect();
        unknown.sort_by_key(|(_, entry)| entry.line);
        match unknown.first() {
            Some((key, entry)) => Err(ConfError::at(
                entry.line,
                ConfErrorKind::UnknownKey {
                    section: self.name.clone(),
                    key: (*key).clone(),
                },
            )),
            None => Ok(()),
        }
    }

    fn invalid(&self, key: &str, entry: &Entry, reason: impl ToString) -> ConfError {
        ConfError::at(
            entry.line,
            ConfErrorKind::InvalidValue {
                section: self.name.clone(),
                key: key.to_string(),
                reason: reason.to_string(),
            },
        )
    }

    /// Parse a required value with `FromStr`
    fn parse<T>(&self, key: &str) -> Result<T, ConfError>
    where
        T: std::str::FromStr,
        T::Err: ToString,
    {
        let entry = self.require(key)?;
        entry.value.parse().map_err(|e: T::Err| self.invalid(key, entry, e))
    }

    /// Parse an optional value with `FromStr`
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfError>
    where
        T: std::str::FromStr,
        T::Err: ToString,
    {
        match self.get(key) {
            Some(_) => self.parse(key),
            None => Ok(default),
        }
    }
}

fn lex(input: &str) -> Result<Vec<Section>, ConfError> {
    let mut sections: Vec<Section> = Vec::new();

    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        if let Some(name) = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ConfError::at(line, ConfErrorKind::Syntax(trimmed.to_string())));
            }
            if sections.iter().any(|s| s.name == name) {
                return Err(ConfError::at(line, ConfErrorKind::DuplicateSection(name)));
            }
            sections.push(Section {
                name,
                line,
                entries: HashMap::new(),
            });
            continue;
        }

        let Some((key, value)) = trimmed.split_once('=') else {
            return Err(ConfError::at(line, ConfErrorKind::Syntax(trimmed.to_string())));
        };
        let key = key.trim().to_ascii_lowercase();
        if key.is_empty() {
            return Err(ConfError::at(line, ConfErrorKind::Syntax(trimmed.to_string())));
        }
        let Some(section) = sections.last_mut() else {
            return Err(ConfError::at(line, ConfErrorKind::KeyOutsideSection(key)));
        };
        if section.entries.contains_key(&key) {
            return Err(ConfError::at(
                line,
                ConfErrorKind::DuplicateKey {
                    section: section.name.clone(),
                    key,
                },
            ));
        }
        section.entries.insert(
            key,
            Entry {
                value: unquote(value.trim()).to_string(),
                line,
            },
        );
    }

    Ok(sections)
}

/// Strip one pair of surrounding double quotes
fn unquote(value: &str) -> &str {
    match value.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
        Some(inner) => inner,
        None => value,
    }
}

/// Quote a value whose edge whitespace or surrounding quotes would not
/// survive [`unquote`] after trimming
fn quote(value: &str) -> Cow<'_, str> {
    let edge_space = value.trim() != value;
    let quoted = value.len() >= 2 && value.starts_with('"') && value.ends_with('"');
    if edge_space || quoted {
        Cow::Owned(format!("\"{value}\""))
    } else {
        Cow::Borrowed(value)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("expected a boolean (0/1, true/false, yes/no, on/off), found {:?}", other)),
    }
}

// ==================== Parsing ====================

struct Document {
    sections: HashMap<String, Section>,
}

impl Document {
    fn new(sections: Vec<Section>) -> Self {
        Self {
            sections: sections.into_iter().map(|s| (s.name.clone(), s)).collect(),
        }
    }

    fn section(&self, name: &str) -> Result<&Section, ConfError> {
        self.sections
            .get(name)
            .ok_or_else(|| ConfError::unplaced(ConfErrorKind::MissingSection(name.to_string())))
    }

    /// Member keys declared by an index section (`[loggers] keys=...`)
    fn members(&self, index: &str) -> Result<Vec<String>, ConfError> {
        let section = self.section(index)?;
        section.check_keys(&["keys"])?;
        Ok(split_list(&section.require("keys")?.value))
    }

    /// Every section must be an index section or a declared member section
    fn check_sections(
        &self,
        loggers: &[String],
        handlers: &[String],
        formatters: &[String],
    ) -> Result<(), ConfError> {
        let mut sections: Vec<&Section> = self.sections.values().collect();
        sections.sort_by_key(|s| s.line);

        for section in sections {
            let name = section.name.as_str();
            if [LOGGERS, HANDLERS, FORMATTERS].contains(&name) {
                continue;
            }
            let declared = if let Some(key) = name.strip_prefix(LOGGER_PREFIX) {
                loggers.iter().any(|k| k == key)
            } else if let Some(key) = name.strip_prefix(HANDLER_PREFIX) {
                handlers.iter().any(|k| k == key)
            } else if let Some(key) = name.strip_prefix(FORMATTER_PREFIX) {
                formatters.iter().any(|k| k == key)
            } else {
                return Err(ConfError::at(
                    section.line,
                    ConfErrorKind::UnknownSection(name.to_string()),
                ));
            };
            if !declared {
                return Err(ConfError::at(
                    section.line,
                    ConfErrorKind::UndeclaredSection(name.to_string()),
                ));
            }
        }
        Ok(())
    }

    fn logger(&self, key: &str) -> Result<LoggerSpec, ConfError> {
        let section = self.section(&format!("{LOGGER_PREFIX}{key}"))?;
        section.check_keys(LOGGER_KEYS)?;

        let is_root = key == ROOT_LOGGER;
        let name = match section.get("qualname") {
            Some(entry) if is_root => {
                return Err(section.invalid("qualname", entry, "the root logger has no qualname"));
            }
            Some(entry) => {
                let name = entry
                    .value
                    .parse::<LoggerName>()
                    .map_err(|e| section.invalid("qualname", entry, e))?;
                if name.is_root() {
                    return Err(section.invalid(
                        "qualname",
                        entry,
                        "only [logger_root] can declare the root logger",
                    ));
                }
                name
            }
            None if is_root => LoggerName::root(),
            None => key
                .parse::<LoggerName>()
                .map_err(|e| ConfError::at(section.line, ConfErrorKind::Syntax(e.to_string())))?,
        };

        let level: Level = section.parse("level")?;
        let handlers = section
            .get("handlers")
            .map(|entry| split_list(&entry.value))
            .unwrap_or_default();
        let propagate = match section.get("propagate") {
            Some(entry) => {
                parse_bool(&entry.value).map_err(|e| section.invalid("propagate", entry, e))?
            }
            None => !is_root,
        };

        Ok(LoggerSpec::new(name, level)
            .with_key(key)
            .with_handlers(handlers)
            .with_propagate(propagate))
    }

    fn handler(&self, key: &str) -> Result<HandlerSpec, ConfError> {
        let section = self.section(&format!("{HANDLER_PREFIX}{key}"))?;
        let sink_entry = section.require("sink")?;

        let sink = match sink_entry.value.to_ascii_lowercase().as_str() {
            "stdout" => {
                section.check_keys(CONSOLE_HANDLER_KEYS)?;
                SinkSpec::Stdout
            }
            "stderr" => {
                section.check_keys(CONSOLE_HANDLER_KEYS)?;
                SinkSpec::Stderr
            }
            "rotating_file" | "rotating-file" => {
                section.check_keys(FILE_HANDLER_KEYS)?;
                let path = section.require("path")?;
                if path.value.is_empty() {
                    return Err(section.invalid("path", path, "path cannot be empty"));
                }
                let encoding = section
                    .get("encoding")
                    .map(|e| e.value.clone())
                    .unwrap_or_else(|| UTF8_ENCODING.to_string());
                SinkSpec::RotatingFile(
                    RotatingFileSpec::new(&path.value)
                        .with_mode(section.parse_or("mode", FileMode::Append)?)
                        .with_rotation(
                            section.parse_or("max_bytes", 0u64)?,
                            section.parse_or("backup_count", 0u32)?,
                        )
                        .with_encoding(encoding),
                )
            }
            other => {
                return Err(section.invalid(
                    "sink",
                    sink_entry,
                    DomainError::UnknownSinkKind(other.to_string()),
                ));
            }
        };

        let level: Level = section.parse("level")?;
        let formatter = section.require("formatter")?.value.clone();
        Ok(HandlerSpec::new(key, level, formatter, sink))
    }

    fn formatter(&self, key: &str) -> Result<FormatterSpec, ConfError> {
        let section = self.section(&format!("{FORMATTER_PREFIX}{key}"))?;
        section.check_keys(FORMATTER_KEYS)?;

        let pattern: FormatPattern = section.parse("format")?;
        let date_format = section.parse_or("datefmt", DatePattern::default())?;
        Ok(FormatterSpec::new(key, pattern).with_date_format(date_format))
    }
}

/// Parse a `.conf` descriptor into a [`Topology`]
///
/// Only syntax and schema are checked here; referential integrity is left
/// to [`Topology::validate`].
pub fn parse_conf(input: &str) -> Result<Topology, ConfError> {
    let document = Document::new(lex(input)?);

    let logger_keys = document.members(LOGGERS)?;
    let handler_keys = document.members(HANDLERS)?;
    let formatter_keys = document.members(FORMATTERS)?;
    document.check_sections(&logger_keys, &handler_keys, &formatter_keys)?;

    Ok(Topology {
        loggers: logger_keys
            .iter()
            .map(|key| document.logger(key))
            .collect::<Result<_, _>>()?,
        handlers: handler_keys
            .iter()
            .map(|key| document.handler(key))
            .collect::<Result<_, _>>()?,
        formatters: formatter_keys
            .iter()
            .map(|key| document.formatter(key))
            .collect::<Result<_, _>>()?,
    })
}

// ==================== Serialization ====================

/// Serialize a [`Topology`] as a `.conf` descriptor
///
/// Members are written in declaration order, so `parse_conf` of the output
/// yields an equal topology.
pub fn to_conf_string(topology: &Topology) -> String {
    let mut out = String::new();

    let keys = |items: Vec<&str>| items.join(",");
    let _ = writeln!(out, "[{LOGGERS}]");
    let _ = writeln!(out, "keys={}\n", keys(topology.loggers.iter().map(|l| l.key.as_str()).collect()));
    let _ = writeln!(out, "[{HANDLERS}]");
    let _ = writeln!(out, "keys={}\n", keys(topology.handlers.iter().map(|h| h.name.as_str()).collect()));
    let _ = writeln!(out, "[{FORMATTERS}]");
    let _ = writeln!(out, "keys={}", keys(topology.formatters.iter().map(|f| f.name.as_str()).collect()));

    for logger in &topology.loggers {
        let _ = writeln!(out, "\n[{LOGGER_PREFIX}{}]", logger.key);
        let _ = writeln!(out, "level={}", logger.level);
        let _ = writeln!(out, "handlers={}", logger.handlers.join(","));
        if !logger.is_root() {
            if logger.name.as_str() != logger.key {
                let _ = writeln!(out, "qualname={}", logger.name);
            }
            let _ = writeln!(out, "propagate={}", u8::from(logger.propagate));
        } else if logger.propagate {
            let _ = writeln!(out, "propagate=1");
        }
    }

    for handler in &topology.handlers {
        let _ = writeln!(out, "\n[{HANDLER_PREFIX}{}]", handler.name);
        let _ = writeln!(out, "sink={}", handler.sink.kind());
        let _ = writeln!(out, "level={}", handler.level);
        let _ = writeln!(out, "formatter={}", handler.formatter);
        if let SinkSpec::RotatingFile(file) = &handler.sink {
            let _ = writeln!(out, "path={}", quote(&file.path.display().to_string()));
            let _ = writeln!(out, "mode={}", file.mode);
            let _ = writeln!(out, "max_bytes={}", file.max_bytes);
            let _ = writeln!(out, "backup_count={}", file.backup_count);
            let _ = writeln!(out, "encoding={}", file.encoding);
        }
    }

    for formatter in &topology.formatters {
        let _ = writeln!(out, "\n[{FORMATTER_PREFIX}{}]", formatter.name);
        let _ = writeln!(out, "format={}", quote(&formatter.pattern.to_string()));
        let _ = writeln!(out, "datefmt={}", quote(&formatter.date_format.to_string()));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use logtopo_domain::topology::defaults::*;

    /// The stock descriptor, written by hand
    const DEFAULT_CONF: &str = r#"
# Application logging topology

[loggers]
keys=root,app,spacy,transformers

[handlers]
keys=consoleHandler,fileHandler,errorFileHandler

[formatters]
keys=standardFormatter,detailedFormatter

[logger_root]
level=WARNING
handlers=consoleHandler

[logger_app]
level=INFO
handlers=consoleHandler,fileHandler,errorFileHandler
qualname=app
propagate=0

[logger_spacy]
level=WARNING
handlers=consoleHandler
qualname=spacy
propagate=0

[logger_transformers]
level=WARNING
handlers=consoleHandler
qualname=transformers
propagate=0

[handler_consoleHandler]
sink=stdout
level=INFO
formatter=standardFormatter

[handler_fileHandler]
sink=rotating_file
level=DEBUG
formatter=detailedFormatter
path=logs/app.log
mode=append
max_bytes=10485760
backup_count=5
encoding=utf-8

[handler_errorFileHandler]
sink=rotating_file
level=WARNING
formatter=detailedFormatter
path=logs/errors.log
mode=append
max_bytes=10485760
backup_count=5
encoding=utf-8

[formatter_standardFormatter]
format={timestamp} - {loggerName} - {level} - {message}
datefmt=%Y-%m-%d %H:%M:%S

[formatter_detailedFormatter]
format={timestamp} - {loggerName} - {level} - {module}:{line} - {message}
datefmt=%Y-%m-%d %H:%M:%S
"#;

    fn kind(input: &str) -> ConfErrorKind {
        parse_conf(input).unwrap_err().kind
    }

    const MINIMAL_HEADER: &str = "[loggers]\nkeys=root\n[handlers]\nkeys=h\n[formatters]\nkeys=f\n";

    fn minimal(extra_handler: &str) -> String {
        format!(
            "{MINIMAL_HEADER}[logger_root]\nlevel=INFO\nhandlers=h\n\
             [handler_h]\n{extra_handler}\n\
             [formatter_f]\nformat={{message}}\n"
        )
    }

    // ==================== Parsing ====================

    #[test]
    fn test_parses_default_descriptor() {
        let topology = parse_conf(DEFAULT_CONF).unwrap();
        assert_eq!(topology, Topology::default());
        assert!(topology.validate().is_empty());
    }

    #[test]
    fn test_qualname_defaults_to_key() {
        let conf = DEFAULT_CONF.replace("qualname=spacy\n", "");
        let topology = parse_conf(&conf).unwrap();
        assert_eq!(topology.logger(SPACY_LOGGER).unwrap().key, "spacy");
    }

    #[test]
    fn test_qualname_can_differ_from_key() {
        let conf = DEFAULT_CONF.replace("qualname=app\n", "qualname=grammar.app\n");
        let topology = parse_conf(&conf).unwrap();
        let logger = topology.logger("grammar.app").unwrap();
        assert_eq!(logger.key, "app");
    }

    #[test]
    fn test_propagate_defaults_to_true_for_children() {
        let conf = DEFAULT_CONF.replacen("propagate=0\n", "", 1);
        let topology = parse_conf(&conf).unwrap();
        assert!(topology.logger(APP_LOGGER).unwrap().propagate);
        assert!(!topology.root().unwrap().propagate);
    }

    #[test]
    fn test_rotating_file_defaults() {
        let topology = parse_conf(&minimal(
            "sink=rotating_file\nlevel=DEBUG\nformatter=f\npath=out.log",
        ))
        .unwrap();
        let SinkSpec::RotatingFile(file) = &topology.handlers[0].sink else {
            panic!("expected file sink");
        };
        assert_eq!(file.mode, FileMode::Append);
        assert_eq!(file.max_bytes, 0);
        assert_eq!(file.backup_count, 0);
        assert_eq!(file.encoding, "utf-8");
        assert_eq!(
            topology.formatters[0].date_format.as_str(),
            "%Y-%m-%d %H:%M:%S"
        );
    }

    #[test]
    fn test_comments_case_and_whitespace() {
        let conf = "; leading comment\n\
                    [loggers]\n  KEYS = root \n\
                    [handlers]\nkeys=h\n\
                    [formatters]\nkeys=f\n\
                    [logger_root]\nLevel = warn\nhandlers = h\n\
                    # stderr sink\n\
                    [handler_h]\nsink=STDERR\nlevel=error\nformatter=f\n\
                    [formatter_f]\nformat={level}: {message}\n";
        let topology = parse_conf(conf).unwrap();
        assert_eq!(topology.root().unwrap().level, Level::Warning);
        assert_eq!(topology.handlers[0].sink, SinkSpec::Stderr);
        assert_eq!(topology.handlers[0].level, Level::Error);
    }

    // ==================== Errors ====================

    #[test]
    fn test_invalid_level_reports_line() {
        let conf = DEFAULT_CONF.replace("level=INFO\nhandlers=consoleHandler,", "level=LOUD\nhandlers=consoleHandler,");
        let err = parse_conf(&conf).unwrap_err();
        assert!(matches!(err.kind, ConfErrorKind::InvalidValue { ref key, .. } if key == "level"));
        assert!(err.line.is_some());
        assert!(err.to_string().starts_with("line "));
    }

    #[test]
    fn test_missing_member_section() {
        let conf = DEFAULT_CONF.replace("[logger_spacy]", "[logger_nlp]");
        assert!(matches!(kind(&conf), ConfErrorKind::UndeclaredSection(_)));

        let conf = MINIMAL_HEADER.to_string();
        assert_eq!(
            kind(&conf),
            ConfErrorKind::MissingSection("logger_root".to_string())
        );
    }

    #[test]
    fn test_missing_index_section() {
        assert_eq!(
            kind("[loggers]\nkeys=root\n"),
            ConfErrorKind::MissingSection("handlers".to_string())
        );
    }

    #[test]
    fn test_unknown_section_and_key() {
        let conf = format!("{DEFAULT_CONF}\n[extras]\nfoo=bar\n");
        assert_eq!(kind(&conf), ConfErrorKind::UnknownSection("extras".to_string()));

        let conf = DEFAULT_CONF.replace("qualname=spacy", "colour=blue");
        assert!(matches!(kind(&conf), ConfErrorKind::UnknownKey { ref key, .. } if key == "colour"));
    }

    #[test]
    fn test_file_keys_rejected_on_console_sink() {
        let conf = minimal("sink=stdout\nlevel=INFO\nformatter=f\npath=x.log");
        assert!(matches!(kind(&conf), ConfErrorKind::UnknownKey { ref key, .. } if key == "path"));
    }

    #[test]
    fn test_unknown_sink_kind() {
        let conf = minimal("sink=syslog\nlevel=INFO\nformatter=f");
        assert!(matches!(kind(&conf), ConfErrorKind::InvalidValue { ref key, .. } if key == "sink"));
    }

    #[test]
    fn test_missing_required_keys() {
        let conf = minimal("sink=stdout\nlevel=INFO");
        assert!(matches!(kind(&conf), ConfErrorKind::MissingKey { ref key, .. } if key == "formatter"));

        let conf = minimal("sink=rotating_file\nlevel=INFO\nformatter=f");
        assert!(matches!(kind(&conf), ConfErrorKind::MissingKey { ref key, .. } if key == "path"));
    }

    #[test]
    fn test_invalid_pattern_and_numbers() {
        let conf = DEFAULT_CONF.replace("{module}:{line}", "{funcName}");
        assert!(matches!(kind(&conf), ConfErrorKind::InvalidValue { ref key, .. } if key == "format"));

        let conf = DEFAULT_CONF.replacen("max_bytes=10485760", "max_bytes=10MB", 1);
        assert!(matches!(kind(&conf), ConfErrorKind::InvalidValue { ref key, .. } if key == "max_bytes"));

        let conf = DEFAULT_CONF.replacen("propagate=0", "propagate=maybe", 1);
        assert!(matches!(kind(&conf), ConfErrorKind::InvalidValue { ref key, .. } if key == "propagate"));
    }

    #[test]
    fn test_duplicates_and_syntax() {
        let conf = format!("{DEFAULT_CONF}\n[loggers]\nkeys=root\n");
        assert_eq!(kind(&conf), ConfErrorKind::DuplicateSection("loggers".to_string()));

        let conf = DEFAULT_CONF.replace("level=DEBUG\n", "level=DEBUG\nlevel=INFO\n");
        assert!(matches!(kind(&conf), ConfErrorKind::DuplicateKey { .. }));

        assert!(matches!(kind("keys=root\n"), ConfErrorKind::KeyOutsideSection(_)));
        assert!(matches!(kind("[loggers]\njust words\n"), ConfErrorKind::Syntax(_)));
    }

    #[test]
    fn test_root_rejects_qualname() {
        let conf = DEFAULT_CONF.replace(
            "[logger_root]\nlevel=WARNING\n",
            "[logger_root]\nlevel=WARNING\nqualname=top\n",
        );
        assert!(matches!(kind(&conf), ConfErrorKind::InvalidValue { ref key, .. } if key == "qualname"));
    }

    #[test]
    fn test_child_key_cannot_claim_root_name() {
        let conf = DEFAULT_CONF
            .replace("keys=root,app,spacy,transformers", "keys=root,app,spacy,transformers,top")
            .replace(
                "[logger_app]",
                "[logger_top]\nlevel=ERROR\nhandlers=consoleHandler\nqualname=root\n\n[logger_app]",
            );
        let err = parse_conf(&conf).unwrap_err();
        assert!(matches!(err.kind, ConfErrorKind::InvalidValue { ref section, ref key, .. }
            if section == "logger_top" && key == "qualname"));
    }

    #[test]
    fn test_dangling_references_are_left_to_validation() {
        let conf = DEFAULT_CONF.replace(
            "handlers=consoleHandler\nqualname=spacy",
            "handlers=consoleHandler,nlpHandler\nqualname=spacy",
        );
        let topology = parse_conf(&conf).unwrap();
        assert_eq!(topology.errors().len(), 1);
    }

    // ==================== Round trip ====================

    #[test]
    fn test_round_trip_default() {
        let topology = Topology::default();
        let text = to_conf_string(&topology);
        assert_eq!(parse_conf(&text).unwrap(), topology);
    }

    #[test]
    fn test_round_trip_preserves_keys_and_flags() {
        let conf = DEFAULT_CONF
            .replace("qualname=app\n", "qualname=grammar.app\n")
            .replacen("mode=append", "mode=write", 1)
            .replace("handlers=consoleHandler\nqualname=transformers\npropagate=0", "handlers=consoleHandler\nqualname=transformers\npropagate=1");
        let parsed = parse_conf(&conf).unwrap();
        let reparsed = parse_conf(&to_conf_string(&parsed)).unwrap();
        assert_eq!(reparsed, parsed);
        assert!(reparsed.logger("transformers").unwrap().propagate);
        assert_eq!(reparsed.logger("grammar.app").unwrap().key, "app");
    }

    #[test]
    fn test_round_trip_keeps_edge_whitespace_in_patterns() {
        let mut topology = Topology::default();
        topology.formatters[0].pattern = FormatPattern::new("{level} {message}  ").unwrap();
        topology.formatters[1].pattern = FormatPattern::new("\"{message}\"").unwrap();

        let text = to_conf_string(&topology);
        assert!(text.contains("format=\"{level} {message}  \"\n"));
        assert_eq!(parse_conf(&text).unwrap(), topology);
    }

    #[test]
    fn test_quoted_values_are_unquoted() {
        let conf = minimal("sink=stdout\nlevel=INFO\nformatter=f").replace("format={message}", "format=\"  {message}\"");
        let topology = parse_conf(&conf).unwrap();
        assert_eq!(topology.formatters[0].pattern.to_string(), "  {message}");
    }

    #[test]
    fn test_serialized_text_shape() {
        let text = to_conf_string(&Topology::default());
        assert!(text.starts_with("[loggers]\nkeys=root,app,spacy,transformers\n"));
        assert!(text.contains("[handler_fileHandler]\nsink=rotating_file\nlevel=DEBUG\n"));
        assert!(text.contains("max_bytes=10485760\nbackup_count=5\nencoding=utf-8\n"));
        assert!(!text.contains("qualname="));
    }
}
