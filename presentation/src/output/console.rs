//! Console output formatter for topologies

use colored::Colorize;
use logtopo_domain::{Level, LoggerName, SinkSpec, Topology, TopologyIssue};

/// Formats topologies, routes and validation results for console display
pub struct TopologyFormatter;

impl TopologyFormatter {
    /// Human-readable summary of every logger, handler and formatter
    pub fn format(topology: &Topology) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Logging Topology"));
        output.push('\n');

        output.push_str(&Self::section_header("Loggers"));
        for logger in &topology.loggers {
            let propagate = if logger.propagate {
                "propagates".normal()
            } else {
                "no propagation".dimmed()
            };
            output.push_str(&format!(
                "  {:<20} {:<9} {} [{}]\n",
                logger.name.as_str().yellow().bold(),
                logger.level.as_str(),
                propagate,
                logger.handlers.join(", ")
            ));
        }

        output.push_str(&Self::section_header("Handlers"));
        for handler in &topology.handlers {
            output.push_str(&format!(
                "  {:<20} {:<9} {} -> {}\n",
                handler.name.yellow().bold(),
                handler.level.as_str(),
                handler.formatter,
                Self::sink(&handler.sink)
            ));
        }

        output.push_str(&Self::section_header("Formatters"));
        for formatter in &topology.formatters {
            output.push_str(&format!(
                "  {:<20} {}\n  {:<20} {}\n",
                formatter.name.yellow().bold(),
                formatter.pattern,
                "",
                formatter.date_format.as_str().dimmed()
            ));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(topology: &Topology) -> String {
        serde_json::to_string_pretty(topology).unwrap_or_else(|_| "{}".to_string())
    }

    /// Validation findings followed by a one-line verdict
    pub fn format_issues(issues: &[TopologyIssue]) -> String {
        let mut output = String::new();
        for issue in issues {
            let line = issue.to_string();
            if issue.is_error() {
                output.push_str(&format!("  {}\n", line.red()));
            } else {
                output.push_str(&format!("  {}\n", line.yellow()));
            }
        }

        let errors = issues.iter().filter(|i| i.is_error()).count();
        let warnings = issues.len() - errors;
        let verdict = match (errors, warnings) {
            (0, 0) => "OK: topology is valid".green().bold(),
            (0, w) => format!("OK: {} warning(s)", w).yellow().bold(),
            (e, w) => format!("FAILED: {} error(s), {} warning(s)", e, w).red().bold(),
        };
        output.push_str(&format!("{}\n", verdict));
        output
    }

    /// Dispatch chain of one logger, optionally evaluated for a level
    pub fn format_routes(topology: &Topology, name: &LoggerName, level: Option<Level>) -> String {
        let resolved = topology.resolve(name);
        let mut output = String::new();

        output.push_str(&format!(
            "{} {} (effective level {})\n",
            "Logger:".cyan().bold(),
            resolved.name,
            resolved.effective_level
        ));
        if topology.logger(name.as_str()).is_none() {
            output.push_str(&format!(
                "  {}\n",
                "not configured; inherits from its nearest configured ancestor".dimmed()
            ));
        }

        if resolved.chain.is_empty() {
            output.push_str(&format!("  {}\n", "no handlers reached".yellow()));
            return output;
        }

        let delivered = level.map(|level| topology.deliveries(name, level));
        output.push_str(&Self::section_header("Handler chain"));
        for handler_name in &resolved.chain {
            let Some(handler) = topology.handler(handler_name) else {
                output.push_str(&format!("  {:<20} {}\n", handler_name.red(), "undefined handler".red()));
                continue;
            };
            let marker = match &delivered {
                None => String::new(),
                Some(delivered) if delivered.iter().any(|h| h.name == handler.name) => {
                    format!(" {}", "delivered".green())
                }
                Some(_) => format!(" {}", "filtered".dimmed()),
            };
            output.push_str(&format!(
                "  {:<20} {:<9} -> {}{}\n",
                handler.name.yellow(),
                handler.level.as_str(),
                Self::sink(&handler.sink),
                marker
            ));
        }

        if let (Some(level), Some(delivered)) = (level, &delivered) {
            output.push_str(&format!(
                "\n{} record reaches {} handler(s)\n",
                level,
                delivered.len()
            ));
        }
        output
    }

    /// Configuration sources as `(label, location, found)` in priority order
    pub fn format_sources(sources: &[(&str, String, bool)]) -> String {
        let mut output = String::from("Descriptor sources (in priority order):\n");
        for (label, location, found) in sources {
            let marker = if *found {
                "[FOUND]".green().to_string()
            } else {
                "[     ]".to_string()
            };
            output.push_str(&format!("  {} {:<8} {}\n", marker, format!("{}:", label), location));
        }
        output
    }

    fn sink(sink: &SinkSpec) -> String {
        match sink {
            SinkSpec::Stdout | SinkSpec::Stderr => sink.kind().to_string(),
            SinkSpec::RotatingFile(file) if file.rotates() => format!(
                "{} ({}, {} bytes x {} backups)",
                file.path.display(),
                file.mode,
                file.max_bytes,
                file.backup_count
            ),
            SinkSpec::RotatingFile(file) => {
                format!("{} ({}, no rotation)", file.path.display(), file.mode)
            }
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_format_lists_members() {
        plain();
        let text = TopologyFormatter::format(&Topology::default());
        assert!(text.contains("Logging Topology"));
        assert!(text.contains("transformers"));
        assert!(text.contains("errorFileHandler"));
        assert!(text.contains("logs/app.log (append, 10485760 bytes x 5 backups)"));
        assert!(text.contains("{module}:{line}"));
    }

    #[test]
    fn test_format_json_is_valid() {
        let json = TopologyFormatter::format_json(&Topology::default());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["loggers"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_format_issues_verdict() {
        plain();
        assert!(TopologyFormatter::format_issues(&[]).contains("OK: topology is valid"));

        let mut topology = Topology::default();
        topology.loggers.retain(|l| !l.is_root());
        let text = TopologyFormatter::format_issues(&topology.validate());
        assert!(text.contains("FAILED: 1 error(s)"));
        assert!(text.contains("[error]"));
    }

    #[test]
    fn test_format_routes_marks_deliveries() {
        plain();
        let topology = Topology::default();
        let name: LoggerName = "app.parser".parse().unwrap();
        let text = TopologyFormatter::format_routes(&topology, &name, Some(Level::Debug));

        assert!(text.contains("effective level INFO"));
        assert!(text.contains("not configured"));
        // DEBUG is below app's INFO gate, so nothing is delivered
        assert!(text.contains("DEBUG record reaches 0 handler(s)"));

        let name: LoggerName = "app".parse().unwrap();
        let text = TopologyFormatter::format_routes(&topology, &name, Some(Level::Info));
        assert_eq!(text.matches("delivered").count(), 2);
        assert!(text.contains("INFO record reaches 2 handler(s)"));
    }

    #[test]
    fn test_format_sources() {
        plain();
        let text = TopologyFormatter::format_sources(&[
            ("Project", "./logtopo.toml".to_string(), true),
            ("Default", "built-in topology".to_string(), true),
        ]);
        assert!(text.contains("[FOUND] Project: ./logtopo.toml"));
    }
}
