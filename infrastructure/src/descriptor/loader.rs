//! Descriptor loader with multi-source merging

use super::conf::{ConfError, parse_conf};
use super::file_topology::{ConversionError, FileTopology};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use logtopo_application::{DescriptorError, DescriptorSource};
use logtopo_domain::Topology;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Prefix of environment overrides (`LOGTOPO_LOGGERS__APP__LEVEL=DEBUG`)
pub const ENV_PREFIX: &str = "LOGTOPO_";
const ENV_SEPARATOR: &str = "__";
const PROJECT_FILES: &[&str] = &["logtopo.toml", ".logtopo.toml"];
const APP_DIR: &str = "logtopo";
const GLOBAL_FILE: &str = "logging.toml";

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("descriptor not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Conf {
        path: PathBuf,
        #[source]
        source: ConfError,
    },

    #[error("invalid TOML descriptor: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid descriptor: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("incomplete descriptor: {0}")]
    Conversion(#[from] ConversionError),
}

/// Where a layer of configuration comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Explicit,
    Environment,
    Project,
    Global,
    Defaults,
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Explicit => "Explicit",
            SourceKind::Environment => "Env",
            SourceKind::Project => "Project",
            SourceKind::Global => "Global",
            SourceKind::Defaults => "Default",
        }
    }
}

/// One entry of [`DescriptorLoader::sources`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub kind: SourceKind,
    pub location: String,
    pub found: bool,
}

/// Loads the topology descriptor from files, environment and defaults
///
/// Priority (highest to lowest):
/// 1. Explicit path (a `.conf`/`.ini` file is standalone and skips the rest)
/// 2. `LOGTOPO_*` environment variables
/// 3. Project: `./logtopo.toml` or `./.logtopo.toml`
/// 4. Global: `$XDG_CONFIG_HOME/logtopo/logging.toml`
/// 5. The built-in topology (unless a layer sets `inherit_defaults = false`)
#[derive(Debug, Clone)]
pub struct DescriptorLoader {
    explicit: Option<PathBuf>,
    project_dir: PathBuf,
    global_path: Option<PathBuf>,
    discover: bool,
    use_env: bool,
}

impl Default for DescriptorLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorLoader {
    pub fn new() -> Self {
        Self {
            explicit: None,
            project_dir: PathBuf::from("."),
            global_path: Self::global_config_path(),
            discover: true,
            use_env: true,
        }
    }

    pub fn with_explicit(mut self, path: Option<impl Into<PathBuf>>) -> Self {
        self.explicit = path.map(Into::into);
        self
    }

    /// Ignore the project and global files and the environment (`--no-config`)
    pub fn without_discovery(mut self) -> Self {
        self.discover = false;
        self.use_env = false;
        self
    }

    pub fn with_project_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_dir = dir.into();
        self
    }

    pub fn with_global_path(mut self, path: Option<PathBuf>) -> Self {
        self.global_path = path;
        self
    }

    pub fn with_env(mut self, use_env: bool) -> Self {
        self.use_env = use_env;
        self
    }

    /// Get the global descriptor path
    ///
    /// Returns `$XDG_CONFIG_HOME/logtopo/logging.toml` if set,
    /// otherwise the platform config directory equivalent.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join(GLOBAL_FILE))
    }

    /// Get the project-level descriptor path (if it exists)
    pub fn project_config_path(&self) -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(|name| self.project_dir.join(name))
            .find(|path| path.exists())
    }

    /// Configuration sources in priority order, highest first
    pub fn sources(&self) -> Vec<ConfigSource> {
        let mut sources = Vec::new();

        if let Some(path) = &self.explicit {
            sources.push(ConfigSource {
                kind: SourceKind::Explicit,
                location: path.display().to_string(),
                found: path.exists(),
            });
            if is_conf_file(path) {
                return sources;
            }
        }

        if self.use_env {
            sources.push(ConfigSource {
                kind: SourceKind::Environment,
                location: format!("{}*", ENV_PREFIX),
                found: std::env::vars().any(|(key, _)| key.starts_with(ENV_PREFIX)),
            });
        }

        if self.discover {
            sources.push(match self.project_config_path() {
                Some(path) => ConfigSource {
                    kind: SourceKind::Project,
                    location: path.display().to_string(),
                    found: true,
                },
                None => ConfigSource {
                    kind: SourceKind::Project,
                    location: "./logtopo.toml or ./.logtopo.toml".to_string(),
                    found: false,
                },
            });

            if let Some(path) = &self.global_path {
                sources.push(ConfigSource {
                    kind: SourceKind::Global,
                    location: path.display().to_string(),
                    found: path.exists(),
                });
            }
        }

        sources.push(ConfigSource {
            kind: SourceKind::Defaults,
            location: "built-in topology".to_string(),
            found: true,
        });
        sources
    }

    /// Load and merge every source into a [`Topology`]
    pub fn load(&self) -> Result<Topology, LoadError> {
        if let Some(path) = &self.explicit {
            if !path.exists() {
                return Err(LoadError::NotFound(path.clone()));
            }
            if is_conf_file(path) {
                debug!("Loading standalone descriptor {}", path.display());
                return read_conf(path);
            }
        }

        let layers = self.layers();
        let inherit = layers
            .extract_inner::<bool>("inherit_defaults")
            .unwrap_or(true);
        let base = if inherit {
            FileTopology::from(&Topology::default())
        } else {
            FileTopology::default()
        };

        let file: FileTopology = Figment::from(Serialized::defaults(base))
            .merge(layers)
            .extract()
            .map_err(Box::new)?;
        Ok(file.into_topology()?)
    }

    /// File and environment layers, lowest priority first
    fn layers(&self) -> Figment {
        let mut figment = Figment::new();

        if self.discover {
            if let Some(path) = self.global_path.as_ref().filter(|p| p.exists()) {
                debug!("Merging global descriptor {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
            if let Some(path) = self.project_config_path() {
                debug!("Merging project descriptor {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        if self.use_env {
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR));
        }

        if let Some(path) = &self.explicit {
            debug!("Merging explicit descriptor {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        figment
    }
}

impl DescriptorSource for DescriptorLoader {
    fn load(&self) -> Result<Topology, DescriptorError> {
        DescriptorLoader::load(self).map_err(Into::into)
    }

    fn describe(&self) -> String {
        match &self.explicit {
            Some(path) => path.display().to_string(),
            None if self.discover => "layered descriptor".to_string(),
            None => "built-in topology".to_string(),
        }
    }
}

/// `.conf`, `.ini` and `.cfg` files use the key-grouped format
pub fn is_conf_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "conf" | "ini" | "cfg"))
}

/// Read a standalone `.conf` descriptor
pub fn read_conf(path: &Path) -> Result<Topology, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_conf(&text).map_err(|source| LoadError::Conf {
        path: path.to_path_buf(),
        source,
    })
}
