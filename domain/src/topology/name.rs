//! Hierarchical logger names

use crate::core::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Name of the logger at the top of the hierarchy
pub const ROOT_LOGGER: &str = "root";

/// Dotted, qualified logger name (Value Object)
///
/// `app.routes.api` is a child of `app.routes`, which is a child of `app`,
/// which is a child of `root`.
///
/// # Example
///
/// ```
/// use logtopo_domain::LoggerName;
///
/// let name: LoggerName = "app.routes".parse().unwrap();
/// let lineage: Vec<String> = name.lineage().map(|n| n.to_string()).collect();
/// assert_eq!(lineage, vec!["app.routes", "app", "root"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoggerName(String);

impl LoggerName {
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty()
            || trimmed.split('.').any(|segment| segment.is_empty())
            || trimmed.chars().any(char::is_whitespace)
        {
            return Err(DomainError::InvalidLoggerName(name));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Name known to be valid at compile time (built-in descriptor)
    pub(crate) fn from_static(name: &'static str) -> Self {
        debug_assert!(Self::new(name).is_ok(), "invalid built-in logger name {name:?}");
        Self(name.to_string())
    }

    pub fn root() -> Self {
        Self(ROOT_LOGGER.to_string())
    }

    /// Map a `tracing` target / Rust module path (`a::b::c`) to a logger name (`a.b.c`)
    pub fn from_target(target: &str) -> Result<Self, DomainError> {
        Self::new(target.replace("::", "."))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_LOGGER
    }

    /// The direct ancestor; `None` only for the root logger
    pub fn parent(&self) -> Option<LoggerName> {
        if self.is_root() {
            return None;
        }
        match self.0.rsplit_once('.') {
            Some((parent, _)) => Some(Self(parent.to_string())),
            None => Some(Self::root()),
        }
    }

    /// This name followed by every ancestor up to and including `root`
    pub fn lineage(&self) -> impl Iterator<Item = LoggerName> {
        std::iter::successors(Some(self.clone()), LoggerName::parent)
    }
}

impl std::fmt::Display for LoggerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for LoggerName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for LoggerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for LoggerName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for LoggerName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> LoggerName {
        s.parse().unwrap()
    }

    #[test]
    fn test_parent_chain() {
        assert_eq!(name("app.routes.api").parent(), Some(name("app.routes")));
        assert_eq!(name("app").parent(), Some(LoggerName::root()));
        assert_eq!(LoggerName::root().parent(), None);
    }

    #[test]
    fn test_lineage_of_root() {
        let lineage: Vec<LoggerName> = LoggerName::root().lineage().collect();
        assert_eq!(lineage, vec![LoggerName::root()]);
    }

    #[test]
    fn test_from_target() {
        assert_eq!(
            LoggerName::from_target("grammar_ai::cors::checker").unwrap(),
            name("grammar_ai.cors.checker")
        );
    }

    #[test]
    fn test_invalid_names() {
        assert!(LoggerName::new("").is_err());
        assert!(LoggerName::new("app..routes").is_err());
        assert!(LoggerName::new(".app").is_err());
        assert!(LoggerName::new("app.").is_err());
        assert!(LoggerName::new("my app").is_err());
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        assert_eq!(LoggerName::new("  spacy ").unwrap().as_str(), "spacy");
    }
}
