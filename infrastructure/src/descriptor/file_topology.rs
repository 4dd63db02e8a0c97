//! TOML representation of a topology
//!
//! Members are keyed by name:
//!
//! ```toml
//! [loggers.root]
//! level = "WARNING"
//! handlers = ["consoleHandler"]
//!
//! [loggers.app]
//! level = "INFO"
//! handlers = ["consoleHandler", "fileHandler"]
//! propagate = false
//!
//! [handlers.fileHandler]
//! sink = "rotating_file"
//! level = "DEBUG"
//! formatter = "detailedFormatter"
//! path = "logs/app.log"
//! max_bytes = 10485760
//! backup_count = 5
//! ```
//!
//! Every property is optional at this level so that layers can override a
//! single value; completeness is checked when converting into a [`Topology`].

use logtopo_domain::{
    DatePattern, DomainError, FileMode, FormatPattern, FormatterSpec, HandlerSpec, Level,
    LoggerName, LoggerSpec, ROOT_LOGGER, RotatingFileSpec, SinkSpec, Topology, UTF8_ENCODING,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Error converting a merged [`FileTopology`] into a [`Topology`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("{section}.{name}: missing `{key}`")]
    MissingKey {
        section: &'static str,
        name: String,
        key: &'static str,
    },

    #[error("{section}.{name}: {reason}")]
    InvalidValue {
        section: &'static str,
        name: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileTopology {
    /// Start from the built-in topology (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherit_defaults: Option<bool>,
    pub loggers: BTreeMap<String, FileLogger>,
    pub handlers: BTreeMap<String, FileHandler>,
    pub formatters: BTreeMap<String, FileFormatter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileLogger {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handlers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub propagate: Option<bool>,
    /// Dotted logger name when it differs from the table key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualname: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileHandler {
    /// `stdout`, `stderr` or `rotating_file`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sink: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<FileMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileFormatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<FormatPattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datefmt: Option<DatePattern>,
}

/// Property-wise merge of a partial member onto another
trait Overlay {
    fn overlay(&mut self, other: Self);
}

macro_rules! overlay_fields {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl Overlay for $ty {
            fn overlay(&mut self, other: Self) {
                $(
                    if other.$field.is_some() {
                        self.$field = other.$field;
                    }
                )*
            }
        }
    };
}

overlay_fields!(FileLogger { level, handlers, propagate, qualname });
overlay_fields!(FileHandler { sink, level, formatter, path, mode, max_bytes, backup_count, encoding });
overlay_fields!(FileFormatter { format, datefmt });

/// Fold lower-cased keys onto the single member they match case-insensitively.
///
/// Environment variables reach figment lower-cased, so
/// `LOGTOPO_HANDLERS__FILEHANDLER__LEVEL` lands on `filehandler` and has to
/// be carried over to `fileHandler`.
fn fold_case_variants<T: Overlay>(members: &mut BTreeMap<String, T>) {
    let lowered: Vec<String> = members
        .keys()
        .filter(|key| **key == key.to_lowercase())
        .cloned()
        .collect();

    for key in lowered {
        let mut matches = members
            .keys()
            .filter(|other| **other != key && other.to_lowercase() == key);
        let (Some(target), None) = (matches.next().cloned(), matches.next()) else {
            continue;
        };
        if let Some(partial) = members.remove(&key) {
            if let Some(member) = members.get_mut(&target) {
                member.overlay(partial);
            }
        }
    }
}

impl FileTopology {
    pub fn inherits_defaults(&self) -> bool {
        self.inherit_defaults.unwrap_or(true)
    }

    /// Convert into a [`Topology`]: root first, then members by name
    pub fn into_topology(mut self) -> Result<Topology, ConversionError> {
        fold_case_variants(&mut self.loggers);
        fold_case_variants(&mut self.handlers);
        fold_case_variants(&mut self.formatters);

        let mut loggers = self
            .loggers
            .into_iter()
            .map(|(key, logger)| logger.into_spec(key))
            .collect::<Result<Vec<_>, _>>()?;
        loggers.sort_by(|a, b| (!a.is_root(), &a.name).cmp(&(!b.is_root(), &b.name)));

        Ok(Topology {
            loggers,
            handlers: self
                .handlers
                .into_iter()
                .map(|(name, handler)| handler.into_spec(name))
                .collect::<Result<_, _>>()?,
            formatters: self
                .formatters
                .into_iter()
                .map(|(name, formatter)| formatter.into_spec(name))
                .collect::<Result<_, _>>()?,
        })
    }

    /// Serialize as TOML
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl FileLogger {
    fn into_spec(self, key: String) -> Result<LoggerSpec, ConversionError> {
        let invalid = |reason: String| ConversionError::InvalidValue {
            section: "loggers",
            name: key.clone(),
            reason,
        };

        let is_root = key == ROOT_LOGGER;
        let name = match (&self.qualname, is_root) {
            (Some(_), true) => return Err(invalid("the root logger has no qualname".into())),
            (Some(qualname), false) => qualname.parse::<LoggerName>(),
            (None, true) => Ok(LoggerName::root()),
            (None, false) => key.parse::<LoggerName>(),
        }
        .map_err(|e| invalid(e.to_string()))?;
        if !is_root && name.is_root() {
            return Err(invalid("only [loggers.root] can declare the root logger".into()));
        }

        let level = self.level.ok_or_else(|| ConversionError::MissingKey {
            section: "loggers",
            name: key.clone(),
            key: "level",
        })?;

        Ok(LoggerSpec::new(name, level)
            .with_handlers(self.handlers.unwrap_or_default())
            .with_propagate(self.propagate.unwrap_or(!is_root))
            .with_key(key))
    }
}

impl FileHandler {
    fn into_spec(self, name: String) -> Result<HandlerSpec, ConversionError> {
        let missing = |key: &'static str| ConversionError::MissingKey {
            section: "handlers",
            name: name.clone(),
            key,
        };
        let invalid = |reason: String| ConversionError::InvalidValue {
            section: "handlers",
            name: name.clone(),
            reason,
        };

        let kind = self.sink.as_deref().ok_or_else(|| missing("sink"))?;
        let sink = match kind.trim().to_ascii_lowercase().as_str() {
            "stdout" | "stderr" => {
                if self.path.is_some() || self.max_bytes.is_some() || self.backup_count.is_some() {
                    return Err(invalid(format!("file options are not valid for a {} sink", kind)));
                }
                if kind.eq_ignore_ascii_case("stdout") {
                    SinkSpec::Stdout
                } else {
                    SinkSpec::Stderr
                }
            }
            "rotating_file" | "rotating-file" => {
                let path = self.path.clone().ok_or_else(|| missing("path"))?;
                if path.as_os_str().is_empty() {
                    return Err(invalid("path cannot be empty".into()));
                }
                SinkSpec::RotatingFile(
                    RotatingFileSpec::new(path)
                        .with_mode(self.mode.unwrap_or_default())
                        .with_rotation(
                            self.max_bytes.unwrap_or(0),
                            self.backup_count.unwrap_or(0),
                        )
                        .with_encoding(
                            self.encoding
                                .clone()
                                .unwrap_or_else(|| UTF8_ENCODING.to_string()),
                        ),
                )
            }
            other => return Err(invalid(DomainError::UnknownSinkKind(other.into()).to_string())),
        };

        let level = self.level.ok_or_else(|| missing("level"))?;
        let formatter = self.formatter.clone().ok_or_else(|| missing("formatter"))?;
        Ok(HandlerSpec::new(name.clone(), level, formatter, sink))
    }
}

impl FileFormatter {
    fn into_spec(self, name: String) -> Result<FormatterSpec, ConversionError> {
        let pattern = self.format.ok_or_else(|| ConversionError::MissingKey {
            section: "formatters",
            name: name.clone(),
            key: "format",
        })?;
        Ok(FormatterSpec::new(name, pattern).with_date_format(self.datefmt.unwrap_or_default()))
    }
}

impl From<&Topology> for FileTopology {
    fn from(topology: &Topology) -> Self {
        let loggers = topology
            .loggers
            .iter()
            .map(|logger| {
                let qualname = (!logger.is_root() && logger.name.as_str() != logger.key)
                    .then(|| logger.name.to_string());
                let file = FileLogger {
                    level: Some(logger.level),
                    handlers: Some(logger.handlers.clone()),
                    propagate: Some(logger.propagate),
                    qualname,
                };
                (logger.key.clone(), file)
            })
            .collect();

        let handlers = topology
            .handlers
            .iter()
            .map(|handler| {
                let mut file = FileHandler {
                    sink: Some(handler.sink.kind().to_string()),
                    level: Some(handler.level),
                    formatter: Some(handler.formatter.clone()),
                    ..Default::default()
                };
                if let SinkSpec::RotatingFile(spec) = &handler.sink {
                    file.path = Some(spec.path.clone());
                    file.mode = Some(spec.mode);
                    file.max_bytes = Some(spec.max_bytes);
                    file.backup_count = Some(spec.backup_count);
                    file.encoding = Some(spec.encoding.clone());
                }
                (handler.name.clone(), file)
            })
            .collect();

        let formatters = topology
            .formatters
            .iter()
            .map(|formatter| {
                let file = FileFormatter {
                    format: Some(formatter.pattern.clone()),
                    datefmt: Some(formatter.date_format.clone()),
                };
                (formatter.name.clone(), file)
            })
            .collect();

        Self {
            inherit_defaults: None,
            loggers,
            handlers,
            formatters,
        }
    }
}

/// Serialize a [`Topology`] as a TOML descriptor
pub fn to_toml_string(topology: &Topology) -> Result<String, toml::ser::Error> {
    FileTopology::from(topology).to_toml_string()
}

/// Parse a standalone TOML descriptor (no layering, no defaults)
pub fn parse_toml(input: &str) -> Result<Topology, crate::descriptor::LoadError> {
    let file: FileTopology = toml::from_str(input)?;
    Ok(file.into_topology()?)
}
