//! Crate-wide error type for ArchDrift.
//!
//! All fallible core functions return [`ArchDriftResult`]. Variants line up
//! with the error kinds surfaced at the CLI/API boundary, so a caller there
//! can match on `kind()` without string parsing.

use thiserror::Error;

/// Crate-wide result alias.
pub type ArchDriftResult<T> = Result<T, ArchDriftError>;

#[derive(Debug, Error)]
pub enum ArchDriftError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid edge: {0}")]
    InvalidEdge(String),

    #[error("baseline missing: {0}")]
    BaselineMissing(String),

    #[error("baseline hash mismatch: {0}")]
    BaselineHashMismatch(String),

    #[error("snapshot not found: {0}")]
    SnapshotNotFound(String),

    #[error("operation timed out: {0}")]
    Timeout(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("compare failed: {0}")]
    CompareFailed(String),

    #[error("json error on {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("git operation failed: {0}")]
    GitFailure(String),
}

impl ArchDriftError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn invalid_edge(msg: impl Into<String>) -> Self {
        Self::InvalidEdge(msg.into())
    }

    pub fn baseline_missing(msg: impl Into<String>) -> Self {
        Self::BaselineMissing(msg.into())
    }

    pub fn baseline_hash_mismatch(msg: impl Into<String>) -> Self {
        Self::BaselineHashMismatch(msg.into())
    }

    pub fn snapshot_not_found(msg: impl Into<String>) -> Self {
        Self::SnapshotNotFound(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    pub fn compare_failed(msg: impl Into<String>) -> Self {
        Self::CompareFailed(msg.into())
    }

    pub fn git_failure(msg: impl Into<String>) -> Self {
        Self::GitFailure(msg.into())
    }

    /// Stable short name for the error kind, used by collaborators (CLI/API)
    /// that need to branch on kind without matching the message text.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "InvalidConfig",
            Self::InvalidEdge(_) => "InvalidEdge",
            Self::BaselineMissing(_) => "BaselineMissing",
            Self::BaselineHashMismatch(_) => "BaselineHashMismatch",
            Self::SnapshotNotFound(_) => "SnapshotNotFound",
            Self::Timeout(_) => "Timeout",
            Self::Io { .. } => "IOError",
            Self::Json { .. } => "IOError",
            Self::CompareFailed(_) => "CompareFailed",
            Self::GitFailure(_) => "GitFailure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_is_stable() {
        assert_eq!(ArchDriftError::invalid_config("x").kind(), "InvalidConfig");
        assert_eq!(
            ArchDriftError::baseline_hash_mismatch("x").kind(),
            "BaselineHashMismatch"
        );
    }
}
