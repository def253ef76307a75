//! Error types for fault tree construction and analysis.

use thiserror::Error;

/// Errors raised while building, validating or analyzing a fault tree.
///
/// Structural errors (`DuplicateDefinition`, `DanglingGate`, `CycleDetected`,
/// `UndefinedNode`, `InvalidGate`) are fatal to the tree: analysis must not proceed
/// on a tree that failed validation. Expression errors (`InvalidArgument`) are fatal
/// to the analysis and name the offending expression.
///
/// Truncation of the cut-set order or of the probability series is *not* an error;
/// it is reported as a warning on the analysis results.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// An id is declared twice, either in the model or in a fault tree.
    #[error("duplicate definition of '{0}'")]
    DuplicateDefinition(String),

    /// A gate was added to a tree before any of its parents.
    #[error("gate '{gate}' is dangling in fault tree '{tree}': {reason}")]
    DanglingGate { tree: String, gate: String, reason: String },

    /// A gate is its own ancestor. The path runs from the first occurrence of the
    /// repeated gate through the repetition.
    #[error("cycle detected in fault tree '{tree}': {}", .path.join(" -> "))]
    CycleDetected { tree: String, path: Vec<String> },

    /// A child of a gate is neither a gate nor a declared primary event.
    #[error("node '{node}' is not defined (referenced in fault tree '{tree}')")]
    UndefinedNode { tree: String, node: String },

    /// A gate has a number of children its connective cannot accept.
    #[error("gate '{gate}' is malformed: {reason}")]
    InvalidGate { gate: String, reason: String },

    /// The tree has no top gate.
    #[error("fault tree '{0}' has no gates")]
    EmptyTree(String),

    /// Analysis was requested on a tree that has not been validated.
    #[error("fault tree '{0}' must be validated before analysis")]
    NotValidated(String),

    /// An expression parameter is outside of its legal domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A basic event has no probability expression attached.
    #[error("basic event '{0}' has no probability")]
    MissingProbability(String),

    /// An analysis setting is out of range.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_cycle_message_contains_path() {
        let err = Error::CycleDetected {
            tree: "ft".to_string(),
            path: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert_eq!(err.to_string(), "cycle detected in fault tree 'ft': a -> b -> a");
    }

    #[test]
    fn test_dangling_message() {
        let err = Error::DanglingGate {
            tree: "ft".to_string(),
            gate: "g2".to_string(),
            reason: "no parents".to_string(),
        };
        assert!(err.to_string().contains("'g2'"));
        assert!(err.to_string().contains("no parents"));
    }
}
