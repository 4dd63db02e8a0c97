//! Bridge from `tracing` events into the logger topology
//!
//! Library code keeps using `tracing` macros; installing a [`TopologyLayer`]
//! routes every event through the configured loggers and handlers:
//!
//! ```ignore
//! use tracing_subscriber::prelude::*;
//!
//! let registry = Arc::new(InitLoggingUseCase::new(Arc::new(FsSinkFactory::new())).execute(topology)?);
//! tracing_subscriber::registry()
//!     .with(TopologyLayer::new(registry).with_alias("grammar_checker", "app"))
//!     .init();
//! ```

use logtopo_application::LoggerRegistry;
use logtopo_domain::{Level, LogRecord, LoggerName};
use std::fmt::{self, Write as _};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Map a `tracing` level onto the record severity scale
///
/// `tracing` has no level below DEBUG in this scale, so TRACE folds into
/// DEBUG; CRITICAL is only reachable through a [`Logger`](logtopo_application::Logger).
pub fn map_level(level: tracing::Level) -> Level {
    match level {
        tracing::Level::TRACE | tracing::Level::DEBUG => Level::Debug,
        tracing::Level::INFO => Level::Info,
        tracing::Level::WARN => Level::Warning,
        tracing::Level::ERROR => Level::Error,
    }
}

/// `tracing_subscriber` layer that dispatches events through a [`LoggerRegistry`]
pub struct TopologyLayer {
    registry: Arc<LoggerRegistry>,
    /// `(target prefix, logger name)`, longest prefix first
    aliases: Vec<(String, String)>,
}

impl TopologyLayer {
    pub fn new(registry: Arc<LoggerRegistry>) -> Self {
        Self {
            registry,
            aliases: Vec::new(),
        }
    }

    /// Route targets under `target` (e.g. `my_crate`) to `logger` (e.g. `app`)
    pub fn with_alias(mut self, target: impl Into<String>, logger: impl Into<String>) -> Self {
        self.aliases.push((target.into(), logger.into()));
        self.aliases
            .sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()));
        self
    }

    pub fn registry(&self) -> &Arc<LoggerRegistry> {
        &self.registry
    }

    /// Logger name for an event target: `a::b` → `a.b`, aliases applied first
    ///
    /// Targets that do not form a valid name go to the root logger.
    pub fn logger_name(&self, target: &str) -> LoggerName {
        let aliased = self.aliases.iter().find_map(|(prefix, logger)| {
            let rest = target.strip_prefix(prefix.as_str())?;
            if rest.is_empty() {
                Some(logger.clone())
            } else {
                rest.strip_prefix("::").map(|rest| format!("{}::{}", logger, rest))
            }
        });
        let target = aliased.as_deref().unwrap_or(target);
        LoggerName::from_target(target).unwrap_or_else(|_| LoggerName::root())
    }
}

impl<S: Subscriber> Layer<S> for TopologyLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = map_level(*metadata.level());
        let name = self.logger_name(metadata.target());
        let logger = self.registry.logger_for(&name);
        if !logger.is_enabled_for(level) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let line = metadata.line().unwrap_or(0);
        let record = LogRecord::new(name.as_str(), level, visitor.finish());
        let record = match (metadata.file(), metadata.module_path()) {
            (Some(file), _) => record.with_source_file(file, line),
            (None, Some(module)) => {
                record.with_location(module.rsplit("::").next().unwrap_or(module), line)
            }
            (None, None) => record.with_location(name.as_str(), line),
        };
        logger.log_record(&record);
    }
}

/// Collects the `message` field and renders the rest as `key=value`
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn push_field(&mut self, field: &Field, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={}", field.name(), value);
    }

    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.push_field(field, format_args!("{}", value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.push_field(field, format_args!("{:?}", value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::FsSinkFactory;
    use logtopo_application::InitLoggingUseCase;
    use logtopo_domain::{RotatingFileSpec, SinkSpec, Topology};
    use std::path::Path;
    use tracing_subscriber::layer::SubscriberExt;

    /// Stock topology with console output redirected to `logs/console.log`
    fn registry(dir: &Path) -> Arc<LoggerRegistry> {
        registry_with(dir, |_| {})
    }

    fn registry_with(dir: &Path, adjust: impl FnOnce(&mut Topology)) -> Arc<LoggerRegistry> {
        let mut topology = Topology::default();
        adjust(&mut topology);
        for handler in &mut topology.handlers {
            if handler.sink.is_console() {
                handler.sink = SinkSpec::RotatingFile(RotatingFileSpec::new("logs/console.log"));
            }
        }
        let sinks = Arc::new(FsSinkFactory::new().with_base_dir(dir));
        Arc::new(InitLoggingUseCase::new(sinks).execute(topology).unwrap())
    }

    fn read(dir: &Path, name: &str) -> String {
        std::fs::read_to_string(dir.join("logs").join(name)).unwrap_or_default()
    }

    fn with_layer(layer: TopologyLayer, f: impl FnOnce()) {
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, f);
    }

    #[test]
    fn test_map_level() {
        assert_eq!(map_level(tracing::Level::TRACE), Level::Debug);
        assert_eq!(map_level(tracing::Level::DEBUG), Level::Debug);
        assert_eq!(map_level(tracing::Level::INFO), Level::Info);
        assert_eq!(map_level(tracing::Level::WARN), Level::Warning);
        assert_eq!(map_level(tracing::Level::ERROR), Level::Error);
    }

    #[test]
    fn test_logger_name_with_aliases() {
        let dir = tempfile::tempdir().unwrap();
        let layer = TopologyLayer::new(registry(dir.path()))
            .with_alias("grammar", "app")
            .with_alias("grammar::nlp", "spacy");

        assert_eq!(layer.logger_name("grammar").as_str(), "app");
        assert_eq!(layer.logger_name("grammar::rules").as_str(), "app.rules");
        assert_eq!(layer.logger_name("grammar::nlp::tokens").as_str(), "spacy.tokens");
        assert_eq!(layer.logger_name("grammarly").as_str(), "grammarly");
        assert_eq!(layer.logger_name("hyper::proto").as_str(), "hyper.proto");
        assert!(layer.logger_name("").is_root());
    }

    #[test]
    fn test_events_route_through_topology() {
        let dir = tempfile::tempdir().unwrap();
        let layer = TopologyLayer::new(registry(dir.path())).with_alias("grammar", "app");

        with_layer(layer, || {
            tracing::debug!(target: "grammar::rules", "rule table loaded");
            tracing::info!(target: "grammar::rules", "checked sentence");
            tracing::warn!(target: "grammar", "suspicious agreement");
        });

        // app.rules inherits INFO from app, so the DEBUG event is dropped
        let app = read(dir.path(), "app.log");
        assert!(!app.contains("rule table loaded"));
        assert!(app.contains(" - app.rules - INFO - layer:"));

        let console = read(dir.path(), "console.log");
        assert!(!console.contains("rule table loaded"));
        assert_eq!(console.matches("checked sentence").count(), 1);
        assert!(console.contains(" - app - WARNING - suspicious agreement"));

        let errors = read(dir.path(), "errors.log");
        assert!(errors.contains("suspicious agreement"));
        assert!(!errors.contains("checked sentence"));
    }

    #[test]
    fn test_debug_events_reach_only_the_app_file_when_app_is_debug() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_with(dir.path(), |topology| {
            if let Some(app) = topology.loggers.iter_mut().find(|l| l.name.as_str() == "app") {
                app.level = Level::Debug;
            }
        });
        let layer = TopologyLayer::new(registry).with_alias("grammar", "app");

        with_layer(layer, || {
            tracing::debug!(target: "grammar::rules", "rule table loaded");
        });

        let app = read(dir.path(), "app.log");
        assert!(app.contains(" - app.rules - DEBUG - layer:"));
        assert!(app.contains("rule table loaded"));
        assert!(!read(dir.path(), "console.log").contains("rule table loaded"));
        assert!(!read(dir.path(), "errors.log").contains("rule table loaded"));
    }

    #[test]
    fn test_unconfigured_targets_fall_back_to_root() {
        let dir = tempfile::tempdir().unwrap();
        let layer = TopologyLayer::new(registry(dir.path()));

        with_layer(layer, || {
            tracing::info!(target: "hyper::proto", "connection opened");
            tracing::error!(target: "hyper::proto", "connection reset");
        });

        let console = read(dir.path(), "console.log");
        assert!(!console.contains("connection opened"));
        assert!(console.contains(" - hyper.proto - ERROR - connection reset"));
        assert!(!read(dir.path(), "app.log").contains("connection"));
    }

    #[test]
    fn test_fields_follow_message() {
        let dir = tempfile::tempdir().unwrap();
        let layer = TopologyLayer::new(registry(dir.path()));

        with_layer(layer, || {
            tracing::info!(target: "app", words = 12, lang = "fr", "parsed");
            tracing::info!(target: "app", elapsed_ms = 3);
        });

        let app = read(dir.path(), "app.log");
        assert!(app.contains("- parsed words=12 lang=fr"));
        assert!(app.contains("- elapsed_ms=3"));
    }
}
