//! The built-in descriptor: an application logger, two quiet third-party
//! loggers, one console sink and two rotating log files.

use super::entities::{
    FileMode, FormatterSpec, HandlerSpec, LoggerSpec, RotatingFileSpec, SinkSpec, Topology,
};
use super::name::LoggerName;
use crate::format::date::DatePattern;
use crate::format::pattern::FormatPattern;
use crate::record::level::Level;

pub const APP_LOGGER: &str = "app";
pub const SPACY_LOGGER: &str = "spacy";
pub const TRANSFORMERS_LOGGER: &str = "transformers";

pub const CONSOLE_HANDLER: &str = "consoleHandler";
pub const FILE_HANDLER: &str = "fileHandler";
pub const ERROR_FILE_HANDLER: &str = "errorFileHandler";

pub const STANDARD_FORMATTER: &str = "standardFormatter";
pub const DETAILED_FORMATTER: &str = "detailedFormatter";

pub const STANDARD_PATTERN: &str = "{timestamp} - {loggerName} - {level} - {message}";
pub const DETAILED_PATTERN: &str =
    "{timestamp} - {loggerName} - {level} - {module}:{line} - {message}";

pub const APP_LOG_PATH: &str = "logs/app.log";
pub const ERROR_LOG_PATH: &str = "logs/errors.log";

/// 10 MiB
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_BACKUP_COUNT: u32 = 5;

fn logger(name: &'static str, level: Level) -> LoggerSpec {
    LoggerSpec::new(LoggerName::from_static(name), level)
}

fn rotating_file(path: &str) -> SinkSpec {
    SinkSpec::RotatingFile(
        RotatingFileSpec::new(path)
            .with_mode(FileMode::Append)
            .with_rotation(DEFAULT_MAX_BYTES, DEFAULT_BACKUP_COUNT),
    )
}

fn formatter(name: &str, pattern: &str) -> FormatterSpec {
    let pattern = FormatPattern::new(pattern).expect("built-in patterns are valid");
    FormatterSpec::new(name, pattern).with_date_format(DatePattern::default())
}

/// Build the default topology
pub fn default_topology() -> Topology {
    Topology {
        loggers: vec![
            LoggerSpec::root(Level::Warning).with_handler(CONSOLE_HANDLER),
            logger(APP_LOGGER, Level::Info)
                .with_handlers([CONSOLE_HANDLER, FILE_HANDLER, ERROR_FILE_HANDLER])
                .with_propagate(false),
            logger(SPACY_LOGGER, Level::Warning)
                .with_handler(CONSOLE_HANDLER)
                .with_propagate(false),
            logger(TRANSFORMERS_LOGGER, Level::Warning)
                .with_handler(CONSOLE_HANDLER)
                .with_propagate(false),
        ],
        handlers: vec![
            HandlerSpec::new(CONSOLE_HANDLER, Level::Info, STANDARD_FORMATTER, SinkSpec::Stdout),
            HandlerSpec::new(
                FILE_HANDLER,
                Level::Debug,
                DETAILED_FORMATTER,
                rotating_file(APP_LOG_PATH),
            ),
            HandlerSpec::new(
                ERROR_FILE_HANDLER,
                Level::Warning,
                DETAILED_FORMATTER,
                rotating_file(ERROR_LOG_PATH),
            ),
        ],
        formatters: vec![
            formatter(STANDARD_FORMATTER, STANDARD_PATTERN),
            formatter(DETAILED_FORMATTER, DETAILED_PATTERN),
        ],
    }
}

impl Default for Topology {
    fn default() -> Self {
        default_topology()
    }
}
