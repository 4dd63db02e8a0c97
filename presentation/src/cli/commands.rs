//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use logtopo_domain::Level;
use std::path::PathBuf;

/// Output format for `show`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ShowFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// Key-grouped `.conf` descriptor
    Conf,
    /// TOML descriptor
    Toml,
    /// JSON
    Json,
}

/// CLI arguments for logtopo
#[derive(Parser, Debug)]
#[command(name = "logtopo")]
#[command(author, version, about = "Declarative logging topology: loggers, handlers and rotating sinks")]
#[command(long_about = r#"
logtopo loads a logging topology (loggers, handlers, formatters), checks it,
and shows how records are routed.

Descriptors are loaded from (in priority order):
1. --config <path>          Explicit descriptor (.conf/.ini files stand alone)
2. LOGTOPO_* variables      e.g. LOGTOPO_LOGGERS__APP__LEVEL=DEBUG
3. ./logtopo.toml           Project-level descriptor
4. ~/.config/logtopo/logging.toml   Global descriptor
5. Built-in topology

Example:
  logtopo check
  logtopo show --format conf > logging.conf
  logtopo routes app.parser --level DEBUG
  logtopo emit app WARNING "disk almost full"
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a descriptor file (.conf, .ini or .toml)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Ignore project/global descriptors and LOGTOPO_* variables
    #[arg(long, global = true)]
    pub no_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load and validate the topology; exits non-zero on errors
    Check,

    /// Print the resolved topology
    Show {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: ShowFormat,
    },

    /// Show which handlers receive records from a logger
    Routes {
        /// Dotted logger name (e.g. app.parser)
        logger: String,

        /// Only list handlers that accept records at this level
        #[arg(short, long, value_parser = parse_level)]
        level: Option<Level>,
    },

    /// Open the sinks and emit one record
    Emit {
        /// Dotted logger name
        logger: String,

        /// DEBUG, INFO, WARNING, ERROR or CRITICAL
        #[arg(value_parser = parse_level)]
        level: Level,

        /// Message text
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,

        /// Directory that relative file paths resolve against
        #[arg(long, value_name = "DIR")]
        log_dir: Option<PathBuf>,
    },

    /// Show descriptor locations and exit
    Sources,
}

fn parse_level(value: &str) -> Result<Level, String> {
    value.parse().map_err(|e: logtopo_domain::DomainError| e.to_string())
}
