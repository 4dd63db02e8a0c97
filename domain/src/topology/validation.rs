//! Semantic validation of a [`Topology`].
//!
//! Syntax is the loader's concern; this module checks referential integrity
//! and the invariants the runtime relies on. All issues are reported, not
//! just the first one.
//!
//! # Examples
//!
//! ```
//! use logtopo_domain::Topology;
//!
//! let issues = Topology::default().validate();
//! assert!(issues.is_empty());
//! ```

use super::entities::Topology;
use std::collections::HashSet;

/// Characters that delimit lists, sections and keys in descriptor files
const RESERVED_NAME_CHARS: [char; 4] = [',', '[', ']', '='];

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || RESERVED_NAME_CHARS.contains(&c))
}

/// Severity level of a topology issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the topology cannot be instantiated.
    Error,
    /// Non-fatal: the topology works but may not behave as expected.
    Warning,
}

/// Identifies a specific topology issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyIssueCode {
    /// No `root` logger is declared.
    MissingRoot,
    /// `root` has propagation enabled; it has no ancestor to propagate to.
    RootPropagates,
    DuplicateLogger,
    DuplicateHandler,
    DuplicateFormatter,
    /// A logger is bound to no handler at all.
    LoggerWithoutHandlers,
    /// A logger references a handler that is not declared.
    UnknownHandler,
    /// A handler references a formatter that is not declared.
    UnknownFormatter,
    /// A file sink asks for an encoding other than UTF-8.
    UnsupportedEncoding,
    /// Two file sinks write (and rotate) the same path.
    SharedFilePath,
    /// A handler is declared but no logger binds it.
    UnusedHandler,
    /// A formatter is declared but no handler uses it.
    UnusedFormatter,
    /// A propagating logger reaches the same handler twice, duplicating lines.
    DuplicateDelivery,
    /// A logger key, handler or formatter name that cannot be written back to
    /// a descriptor file (empty, whitespace, or one of `,` `[` `]` `=`).
    InvalidName,
}

/// A detected issue in a topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyIssue {
    pub severity: Severity,
    pub code: TopologyIssueCode,
    pub message: String,
}

impl TopologyIssue {
    fn error(code: TopologyIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    fn warning(code: TopologyIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for TopologyIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "[{}] {}", tag, self.message)
    }
}

impl Topology {
    /// Validate the topology, returning every issue found.
    ///
    /// An empty result means the topology is valid. Callers decide how to
    /// treat warnings; any [`Severity::Error`] must prevent instantiation.
    pub fn validate(&self) -> Vec<TopologyIssue> {
        use TopologyIssueCode::*;

        let mut issues = Vec::new();

        // ==================== Names ====================

        let names = self
            .loggers
            .iter()
            .map(|l| ("logger key", l.key.as_str()))
            .chain(self.handlers.iter().map(|h| ("handler", h.name.as_str())))
            .chain(self.formatters.iter().map(|f| ("formatter", f.name.as_str())));
        for (kind, name) in names {
            if !is_valid_name(name) {
                issues.push(TopologyIssue::error(
                    InvalidName,
                    format!("{kind} name '{name}' is empty or contains whitespace, ',', '[', ']' or '='"),
                ));
            }
        }

        // ==================== Uniqueness ====================

        let mut seen = HashSet::new();
        for logger in &self.loggers {
            if !seen.insert(logger.name.as_str()) {
                issues.push(TopologyIssue::error(
                    DuplicateLogger,
                    format!("logger '{}' is declared more than once", logger.name),
                ));
            }
        }
        let mut seen = HashSet::new();
        for handler in &self.handlers {
            if !seen.insert(handler.name.as_str()) {
                issues.push(TopologyIssue::error(
                    DuplicateHandler,
                    format!("handler '{}' is declared more than once", handler.name),
                ));
            }
        }
        let mut seen = HashSet::new();
        for formatter in &self.formatters {
            if !seen.insert(formatter.name.as_str()) {
                issues.push(TopologyIssue::error(
                    DuplicateFormatter,
                    format!("formatter '{}' is declared more than once", formatter.name),
                ));
            }
        }

        // ==================== Loggers ====================

        match self.root() {
            None => issues.push(TopologyIssue::error(
                MissingRoot,
                "no 'root' logger is declared",
            )),
            Some(root) if root.propagate => issues.push(TopologyIssue::error(
                RootPropagates,
                "the 'root' logger cannot propagate",
            )),
            Some(_) => {}
        }

        for logger in &self.loggers {
            if logger.handlers.is_empty() {
                issues.push(TopologyIssue::error(
                    LoggerWithoutHandlers,
                    format!("logger '{}' has no handlers", logger.name),
                ));
            }
            for handler in &logger.handlers {
                if self.handler(handler).is_none() {
                    issues.push(TopologyIssue::error(
                        UnknownHandler,
                        format!(
                            "logger '{}' references unknown handler '{}'",
                            logger.name, handler
                        ),
                    ));
                }
            }
        }

        // ==================== Handlers ====================

        for handler in &self.handlers {
            if self.formatter(&handler.formatter).is_none() {
                issues.push(TopologyIssue::error(
                    UnknownFormatter,
                    format!(
                        "handler '{}' references unknown formatter '{}'",
                        handler.name, handler.formatter
                    ),
                ));
            }
        }

        let mut paths = HashSet::new();
        for (handler, file) in self.file_handlers() {
            if !file.is_utf8() {
                issues.push(TopologyIssue::error(
                    UnsupportedEncoding,
                    format!(
                        "handler '{}' uses encoding '{}'; only utf-8 is supported",
                        handler.name, file.encoding
                    ),
                ));
            }
            if !paths.insert(file.path.as_path()) {
                issues.push(TopologyIssue::error(
                    SharedFilePath,
                    format!(
                        "handler '{}' writes '{}', which another handler already writes",
                        handler.name,
                        file.path.display()
                    ),
                ));
            }
        }

        // ==================== Warnings ====================

        for handler in &self.handlers {
            if !self.loggers.iter().any(|l| l.binds(&handler.name)) {
                issues.push(TopologyIssue::warning(
                    UnusedHandler,
                    format!("handler '{}' is not bound to any logger", handler.name),
                ));
            }
        }

        for formatter in &self.formatters {
            if !self.handlers.iter().any(|h| h.formatter == formatter.name) {
                issues.push(TopologyIssue::warning(
                    UnusedFormatter,
                    format!("formatter '{}' is not used by any handler", formatter.name),
                ));
            }
        }

        for logger in self.loggers.iter().filter(|l| l.propagate) {
            let chain = self.resolve(&logger.name).chain;
            let mut seen = HashSet::new();
            if let Some(duplicate) = chain.iter().find(|h| !seen.insert(h.as_str())) {
                issues.push(TopologyIssue::warning(
                    DuplicateDelivery,
                    format!(
                        "logger '{}' propagates to an ancestor that also binds '{}'; \
                         its records are written twice",
                        logger.name, duplicate
                    ),
                ));
            }
        }

        issues
    }

    /// Only the fatal issues
    pub fn errors(&self) -> Vec<TopologyIssue> {
        self.validate().into_iter().filter(TopologyIssue::is_error).collect()
    }
}
