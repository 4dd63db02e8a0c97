//! Resolution of logger names into effective levels and handler chains.
//!
//! Dispatch follows hierarchical logging semantics:
//!
//! 1. The record is gated once, by the *effective level* of the logger it
//!    is emitted on (its own level, or its nearest configured ancestor's).
//! 2. It is offered to the logger's own handlers, then to each configured
//!    ancestor's handlers, stopping after the first logger whose
//!    `propagate` flag is false.
//! 3. Each handler applies its own level gate.
//!
//! Ancestor logger levels are not consulted in step 2.

use super::entities::{HandlerSpec, Topology};
use super::name::LoggerName;
use crate::record::level::Level;

/// Threshold used when no logger in the lineage is configured
pub const FALLBACK_LEVEL: Level = Level::Warning;

/// A logger name resolved against a topology
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLogger {
    pub name: LoggerName,
    pub effective_level: Level,
    /// Handler names in dispatch order; may repeat when propagation reaches
    /// a handler bound twice
    pub chain: Vec<String>,
}

impl ResolvedLogger {
    pub fn is_enabled_for(&self, level: Level) -> bool {
        level.passes(self.effective_level)
    }
}

impl Topology {
    /// Resolve any logger name, configured or not
    ///
    /// # Example
    ///
    /// ```
    /// use logtopo_domain::Topology;
    ///
    /// let topology = Topology::default();
    /// let resolved = topology.resolve(&"app.routes".parse().unwrap());
    /// assert_eq!(resolved.effective_level.as_str(), "INFO");
    /// assert_eq!(resolved.chain, vec!["consoleHandler", "fileHandler", "errorFileHandler"]);
    /// ```
    pub fn resolve(&self, name: &LoggerName) -> ResolvedLogger {
        let mut effective_level = None;
        let mut chain = Vec::new();

        for ancestor in name.lineage() {
            let Some(logger) = self.logger(ancestor.as_str()) else {
                continue;
            };
            effective_level.get_or_insert(logger.level);
            chain.extend(logger.handlers.iter().cloned());
            if !logger.propagate {
                break;
            }
        }

        ResolvedLogger {
            name: name.clone(),
            effective_level: effective_level.unwrap_or(FALLBACK_LEVEL),
            chain,
        }
    }

    /// Handlers that receive a record of `level` emitted on logger `name`
    ///
    /// A handler is returned iff `level >= effective level` of the logger and
    /// `level >= handler.level`. Unknown handler names are skipped.
    pub fn deliveries(&self, name: &LoggerName, level: Level) -> Vec<&HandlerSpec> {
        let resolved = self.resolve(name);
        if !resolved.is_enabled_for(level) {
            return Vec::new();
        }
        resolved
            .chain
            .iter()
            .filter_map(|handler| self.handler(handler))
            .filter(|handler| handler.accepts(level))
            .collect()
    }
}
