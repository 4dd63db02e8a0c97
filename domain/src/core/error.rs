//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// Raised when a value in a descriptor (level name, logger name, pattern)
/// cannot be turned into its domain type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown level: {0}. Valid: DEBUG, INFO, WARNING, ERROR, CRITICAL")]
    UnknownLevel(String),

    #[error("Invalid logger name: {0:?}")]
    InvalidLoggerName(String),

    #[error("Invalid format pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid date pattern: {0:?}")]
    InvalidDatePattern(String),

    #[error("Unknown file mode: {0}. Valid: append, write")]
    UnknownFileMode(String),

    #[error("Unknown sink kind: {0}. Valid: stdout, stderr, rotating_file")]
    UnknownSinkKind(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_level_display() {
        let error = DomainError::UnknownLevel("VERBOSE".to_string());
        assert_eq!(
            error.to_string(),
            "Unknown level: VERBOSE. Valid: DEBUG, INFO, WARNING, ERROR, CRITICAL"
        );
    }

    #[test]
    fn test_invalid_pattern_display() {
        let error = DomainError::InvalidPattern {
            pattern: "{oops}".to_string(),
            reason: "unknown placeholder 'oops'".to_string(),
        };
        assert!(error.to_string().contains("unknown placeholder 'oops'"));
    }
}
