//! Port for resolving the topology descriptor at startup.

use logtopo_domain::Topology;

/// Error type returned by descriptor sources
pub type DescriptorError = Box<dyn std::error::Error + Send + Sync>;

/// Somewhere a [`Topology`] can be loaded from (built-in, file, layered config)
pub trait DescriptorSource {
    fn load(&self) -> Result<Topology, DescriptorError>;

    /// Where the descriptor comes from, for diagnostics
    fn describe(&self) -> String;
}

/// A descriptor already held in memory
pub struct StaticDescriptor(pub Topology);

impl DescriptorSource for StaticDescriptor {
    fn load(&self) -> Result<Topology, DescriptorError> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        "in-memory descriptor".to_string()
    }
}

impl Default for StaticDescriptor {
    fn default() -> Self {
        Self(Topology::default())
    }
}
