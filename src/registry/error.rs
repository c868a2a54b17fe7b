//! Path Errors
//!
//! Errors raised while parsing a module path or applying it to a module tree.
//! Traversals never produce these; only path parsing, resolution and mutation do.

/// Result type for path operations.
pub type PathResult<T> = Result<T, PathError>;

/// Errors that can occur while parsing or applying a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The path string could not be tokenized.
    MalformedPath {
        /// The offending path, as given.
        path: String,
        /// What the parser tripped on.
        reason: String,
    },

    /// An intermediate step did not resolve: missing attribute, index out of
    /// range, missing key, or a step applied to the wrong kind of value.
    PathResolution {
        /// The full path being resolved.
        path: String,
        /// Rendered prefix up to and including the failing step.
        at: String,
        /// Why the step failed.
        reason: String,
    },

    /// The final step targets a container that cannot be mutated in place.
    ImmutableContainer {
        /// The full path being applied.
        path: String,
        /// Rendered prefix up to and including the failing step.
        at: String,
    },
}

impl PathError {
    pub(crate) fn malformed(path: &str, reason: impl Into<String>) -> Self {
        PathError::MalformedPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn resolution(path: &str, at: impl Into<String>, reason: impl Into<String>) -> Self {
        PathError::PathResolution {
            path: path.to_string(),
            at: at.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn immutable(path: &str, at: impl Into<String>) -> Self {
        PathError::ImmutableContainer {
            path: path.to_string(),
            at: at.into(),
        }
    }

    /// The path the error refers to.
    pub fn path(&self) -> &str {
        match self {
            PathError::MalformedPath { path, .. }
            | PathError::PathResolution { path, .. }
            | PathError::ImmutableContainer { path, .. } => path,
        }
    }
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::MalformedPath { path, reason } => {
                write!(f, "Malformed path '{}': {}", path, reason)
            }
            PathError::PathResolution { path, at, reason } => {
                write!(f, "Cannot resolve '{}' in path '{}': {}", at, path, reason)
            }
            PathError::ImmutableContainer { path, at } => {
                write!(f, "Cannot assign through '{}' in path '{}': container is immutable", at, path)
            }
        }
    }
}

impl std::error::Error for PathError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_path() {
        let err = PathError::malformed("a[0", "unbalanced '['");
        assert_eq!(err.to_string(), "Malformed path 'a[0': unbalanced '['");
        assert_eq!(err.path(), "a[0");
    }

    #[test]
    fn test_resolution_display() {
        let err = PathError::resolution("sub.missing.x", "sub.missing", "no attribute 'missing'");
        assert!(err.to_string().contains("sub.missing"));
        assert!(err.to_string().contains("no attribute"));
    }

    #[test]
    fn test_immutable_display() {
        let err = PathError::immutable("t[0]", "t[0]");
        assert!(err.to_string().contains("immutable"));
    }
}
