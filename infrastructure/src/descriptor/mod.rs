//! Persisted topology descriptors: `.conf` and layered TOML

pub mod conf;
pub mod file_topology;
pub mod loader;

pub use conf::{ConfError, ConfErrorKind, parse_conf, to_conf_string};
pub use file_topology::{ConversionError, FileTopology, parse_toml, to_toml_string};
pub use loader::{
    ConfigSource, DescriptorLoader, ENV_PREFIX, LoadError, SourceKind, is_conf_file, read_conf,
};
