//! Error types for object storage credential wiring
//!
//! The pure patching pipeline has a single failure mode, a merge that could
//! not be applied to the target pod spec. The manifest helpers used by the
//! CLI add decoding and IO errors on top.

use std::time::Duration;
use thiserror::Error;

/// Which of the two merges in the pipeline failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStage {
    /// Secret volume, token projection and credential env vars
    Credentials,
    /// Custom CA config map and `-s3.http.ca-file` argument
    CertificateAuthority,
}

impl std::fmt::Display for MergeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeStage::Credentials => write!(f, "object storage credentials"),
            MergeStage::CertificateAuthority => write!(f, "object storage ca options"),
        }
    }
}

/// Structural merge failures
#[derive(Error, Debug)]
pub enum MergeError {
    #[error("workload has no pod template spec")]
    MissingPodSpec,

    #[error("pod spec has no container to patch")]
    MissingContainer,

    #[error("type mismatch at {path}: cannot merge {source_kind} into {target_kind}")]
    TypeMismatch {
        path: String,
        source_kind: &'static str,
        target_kind: &'static str,
    },

    #[error("pod spec serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Unified error type for the crate
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Patching Errors
    // =========================================================================
    #[error("failed to merge {stage} spec: {source}")]
    Merge {
        stage: MergeStage,
        #[source]
        source: MergeError,
    },

    // =========================================================================
    // Manifest Errors
    // =========================================================================
    #[error("Unsupported workload kind: {0}")]
    UnsupportedKind(String),

    #[error("Unknown object storage type: {0}")]
    UnknownStorageType(String),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Action to take on error during reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorAction {
    /// Requeue with exponential backoff
    RequeueWithBackoff,
    /// Requeue after specific duration
    RequeueAfter(Duration),
    /// Don't requeue, wait for changes
    NoRequeue,
}

impl Error {
    pub(crate) fn merge(stage: MergeStage, source: MergeError) -> Self {
        Error::Merge { stage, source }
    }

    /// Determine what action to take for this error
    pub fn action(&self) -> ErrorAction {
        match self {
            // A half-applied merge leaves the workload undefined, start over
            Error::Merge { .. } => ErrorAction::RequeueWithBackoff,

            // Input is malformed, nothing changes until the input does
            Error::UnsupportedKind(_)
            | Error::UnknownStorageType(_)
            | Error::YamlParse(_) => ErrorAction::NoRequeue,

            Error::Io(_) => ErrorAction::RequeueAfter(Duration::from_secs(30)),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        !matches!(self.action(), ErrorAction::NoRequeue)
    }
}

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, Error>;
