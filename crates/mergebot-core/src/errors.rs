//! Logic errors.

use thiserror::Error;

/// Logic error.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum DomainError {
    #[error(
        "Could not merge pull request #{} on repository {} after {} attempt(s)",
        pr_number,
        repository_path,
        attempts
    )]
    MergeFailed {
        pr_number: u64,
        repository_path: String,
        attempts: u32,
    },

    #[error(
        "Pull request #{} cannot be rolled into '{}': branch '{}' conflicts",
        pr_number,
        main_branch,
        head_branch
    )]
    RollupConflict {
        pr_number: u64,
        head_branch: String,
        main_branch: String,
    },

    #[error(
        "Could not find a merge base with branch '{}' in {} ms",
        branch,
        timeout_ms
    )]
    TimeoutExceeded { branch: String, timeout_ms: u128 },

    #[error("No merge base between refs: {}", refs.join(", "))]
    MergeBaseNotFound { refs: Vec<String> },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// Wraps [`mergebot_ghapi_interface::ApiError`].
    #[error("API error: {source}")]
    ApiError {
        source: mergebot_ghapi_interface::ApiError,
    },

    /// Wraps [`mergebot_git::GitError`].
    #[error("Git error: {source}")]
    GitError { source: mergebot_git::GitError },

    /// Wraps [`serde_json::Error`].
    #[error("Could not parse event payload: {source}")]
    EventParseError { source: serde_json::Error },
}

impl From<mergebot_ghapi_interface::ApiError> for DomainError {
    fn from(e: mergebot_ghapi_interface::ApiError) -> Self {
        Self::ApiError { source: e }
    }
}

impl From<mergebot_git::GitError> for DomainError {
    fn from(e: mergebot_git::GitError) -> Self {
        Self::GitError { source: e }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        Self::EventParseError { source: e }
    }
}

/// Result alias for `DomainError`.
pub type Result<T> = core::result::Result<T, DomainError>;
