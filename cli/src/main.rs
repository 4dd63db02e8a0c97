//! CLI entrypoint for logtopo
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use logtopo_application::{DescriptorSource, InitLoggingUseCase};
use logtopo_domain::{LogRecord, LoggerName};
use logtopo_infrastructure::{
    DescriptorLoader, FsSinkFactory, StderrReporter, to_conf_string, to_toml_string,
};
use logtopo_presentation::{Cli, Command, ShowFormat, TopologyFormatter};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize diagnostics based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // === Dependency Injection ===
    let mut loader = DescriptorLoader::new().with_explicit(cli.config.clone());
    if cli.no_config {
        loader = loader.without_discovery();
    }
    debug!("Descriptor source: {}", loader.describe());

    match cli.command {
        Command::Sources => {
            let sources: Vec<_> = loader
                .sources()
                .into_iter()
                .map(|s| (s.kind.label(), s.location, s.found))
                .collect();
            print!("{}", TopologyFormatter::format_sources(&sources));
        }

        Command::Check => {
            let topology = loader
                .load()
                .with_context(|| format!("failed to load {}", loader.describe()))?;
            let issues = topology.validate();
            print!("{}", TopologyFormatter::format_issues(&issues));

            let errors = issues.iter().filter(|i| i.is_error()).count();
            if errors > 0 {
                bail!("topology has {} error(s)", errors);
            }
        }

        Command::Show { format } => {
            let topology = loader
                .load()
                .with_context(|| format!("failed to load {}", loader.describe()))?;
            let output = match format {
                ShowFormat::Text => TopologyFormatter::format(&topology),
                ShowFormat::Conf => to_conf_string(&topology),
                ShowFormat::Toml => to_toml_string(&topology)?,
                ShowFormat::Json => TopologyFormatter::format_json(&topology),
            };
            println!("{}", output.trim_end());
        }

        Command::Routes { logger, level } => {
            let topology = loader
                .load()
                .with_context(|| format!("failed to load {}", loader.describe()))?;
            let name: LoggerName = logger.parse()?;
            print!("{}", TopologyFormatter::format_routes(&topology, &name, level));
        }

        Command::Emit {
            logger,
            level,
            message,
            log_dir,
        } => {
            let mut sinks = FsSinkFactory::new();
            if let Some(dir) = log_dir {
                sinks = sinks.with_base_dir(dir);
            }
            let registry = InitLoggingUseCase::new(Arc::new(sinks))
                .with_reporter(Arc::new(StderrReporter::new()))
                .execute_from(&loader)?;

            let logger = registry.logger(&logger)?;
            let record = LogRecord::new(logger.name().as_str(), level, message.join(" "))
                .with_source_file(file!(), line!());
            let delivered = logger.log_record(&record);
            registry.flush()?;

            info!(
                "{} record on '{}' delivered to {} handler(s)",
                level,
                logger.name(),
                delivered
            );
        }
    }

    Ok(())
}
