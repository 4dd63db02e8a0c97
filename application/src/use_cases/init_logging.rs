//! Init Logging use case
//!
//! Instantiates a topology descriptor into a live [`LoggerRegistry`]:
//! validate → formatters → handlers (sinks opened) → loggers.
//! Initialization is all-or-nothing.

use crate::ports::descriptor_source::{DescriptorError, DescriptorSource};
use crate::ports::error_reporter::{ErrorReporter, NoErrorReporter};
use crate::ports::sink::{SinkError, SinkFactory};
use crate::runtime::handler::Handler;
use crate::runtime::registry::LoggerRegistry;
use logtopo_domain::{FormatterSpec, Topology, TopologyIssue};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while initializing logging
#[derive(Error, Debug)]
pub enum InitLoggingError {
    #[error("Failed to load descriptor from {origin}: {error}")]
    Descriptor {
        origin: String,
        #[source]
        error: DescriptorError,
    },

    #[error("Invalid topology: {}", join_issues(.0))]
    InvalidTopology(Vec<TopologyIssue>),

    #[error("Handler '{handler}' could not open its sink: {source}")]
    Sink {
        handler: String,
        #[source]
        source: SinkError,
    },
}

fn join_issues(issues: &[TopologyIssue]) -> String {
    issues
        .iter()
        .map(|i| i.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Use case for turning a descriptor into live loggers
pub struct InitLoggingUseCase<F: SinkFactory + 'static> {
    sinks: Arc<F>,
    reporter: Arc<dyn ErrorReporter>,
}

impl<F: SinkFactory + 'static> InitLoggingUseCase<F> {
    pub fn new(sinks: Arc<F>) -> Self {
        Self {
            sinks,
            reporter: Arc::new(NoErrorReporter),
        }
    }

    /// Route post-startup write failures to `reporter`
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Resolve the descriptor from `source`, then instantiate it
    pub fn execute_from(
        &self,
        source: &dyn DescriptorSource,
    ) -> Result<LoggerRegistry, InitLoggingError> {
        let topology = source.load().map_err(|error| InitLoggingError::Descriptor {
            origin: source.describe(),
            error,
        })?;
        debug!("Loaded descriptor from {}", source.describe());
        self.execute(topology)
    }

    /// Instantiate a topology
    pub fn execute(&self, topology: Topology) -> Result<LoggerRegistry, InitLoggingError> {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            topology.validate().into_iter().partition(TopologyIssue::is_error);
        for issue in &warnings {
            warn!("{}", issue.message);
        }
        if !errors.is_empty() {
            return Err(InitLoggingError::InvalidTopology(errors));
        }

        // Formatters
        let formatters: HashMap<&str, Arc<FormatterSpec>> = topology
            .formatters
            .iter()
            .map(|f| (f.name.as_str(), Arc::new(f.clone())))
            .collect();

        // Handlers (opening sinks is the only step that touches the environment)
        let mut handlers = Vec::with_capacity(topology.handlers.len());
        for spec in &topology.handlers {
            let formatter = formatters
                .get(spec.formatter.as_str())
                .cloned()
                .ok_or_else(|| {
                    InitLoggingError::InvalidTopology(topology.errors())
                })?;
            let sink = self
                .sinks
                .open(spec)
                .map_err(|source| InitLoggingError::Sink {
                    handler: spec.name.clone(),
                    source,
                })?;
            debug!(
                handler = %spec.name,
                level = %spec.level,
                destination = %sink.describe(),
                "Opened sink"
            );
            handlers.push(Arc::new(Handler::new(
                spec.name.clone(),
                spec.level,
                formatter,
                sink,
            )));
        }

        info!(
            "Logging initialized: {} loggers, {} handlers, {} formatters",
            topology.loggers.len(),
            handlers.len(),
            formatters.len()
        );

        // Loggers
        Ok(LoggerRegistry::new(
            topology,
            handlers,
            Arc::clone(&self.reporter),
        ))
    }
}
