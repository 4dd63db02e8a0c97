//! Process-wide set of named loggers.

use super::handler::Handler;
use super::logger::Logger;
use crate::ports::error_reporter::ErrorReporter;
use crate::ports::sink::SinkError;
use logtopo_domain::{DomainError, LoggerName, Topology};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Live loggers and handlers built from a [`Topology`]
///
/// Loggers are resolved on first lookup and cached. Every sink is flushed
/// when the registry is dropped.
pub struct LoggerRegistry {
    topology: Arc<Topology>,
    handlers: HashMap<String, Arc<Handler>>,
    reporter: Arc<dyn ErrorReporter>,
    cache: RwLock<HashMap<LoggerName, Logger>>,
}

impl LoggerRegistry {
    pub(crate) fn new(
        topology: Topology,
        handlers: Vec<Arc<Handler>>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        let registry = Self {
            topology: Arc::new(topology),
            handlers: handlers
                .into_iter()
                .map(|h| (h.name().to_string(), h))
                .collect(),
            reporter,
            cache: RwLock::new(HashMap::new()),
        };

        // Configured loggers are resolved up front; children resolve lazily.
        let configured: Vec<LoggerName> =
            registry.topology.loggers.iter().map(|l| l.name.clone()).collect();
        for name in &configured {
            registry.logger_for(name);
        }
        registry
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Look up a logger by qualified name (e.g. `app`, `app.routes`)
    pub fn logger(&self, name: &str) -> Result<Logger, DomainError> {
        Ok(self.logger_for(&name.parse()?))
    }

    /// Look up a logger by an already validated name
    pub fn logger_for(&self, name: &LoggerName) -> Logger {
        if let Some(logger) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return logger.clone();
        }

        let resolved = self.topology.resolve(name);
        let chain = resolved
            .chain
            .iter()
            .filter_map(|handler| self.handlers.get(handler).cloned())
            .collect();
        let logger = Logger::new(
            resolved.name,
            resolved.effective_level,
            chain,
            Arc::clone(&self.reporter),
        );

        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.clone())
            .or_insert(logger)
            .clone()
    }

    pub fn root(&self) -> Logger {
        self.logger_for(&LoggerName::root())
    }

    pub fn handler(&self, name: &str) -> Option<&Arc<Handler>> {
        self.handlers.get(name)
    }

    /// Handlers in declaration order
    pub fn handlers(&self) -> Vec<&Arc<Handler>> {
        self.topology
            .handlers
            .iter()
            .filter_map(|spec| self.handlers.get(&spec.name))
            .collect()
    }

    /// Names of every logger resolved so far, sorted
    pub fn known_loggers(&self) -> Vec<LoggerName> {
        let mut names: Vec<LoggerName> = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Flush every sink, attempting all of them before reporting the first failure
    pub fn flush(&self) -> Result<(), SinkError> {
        let mut first_error = None;
        for handler in self.handlers() {
            if let Err(e) = handler.flush() {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for LoggerRegistry {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl std::fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("loggers", &self.known_loggers())
            .finish()
    }
}
