use mergebot_ghapi_interface::ApiError;

/// GitHub adapter error.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names, missing_docs)]
pub enum GitHubError {
    #[error(transparent)]
    HttpError { source: reqwest::Error },

    #[error(
        "Could not merge pull request #{} on repository {}: {}",
        pr_number,
        repository_path,
        reason
    )]
    MergeError {
        pr_number: u64,
        repository_path: String,
        reason: String,
    },

    #[error("Invalid header value: {source}")]
    InvalidHeaderValue {
        source: http::header::InvalidHeaderValue,
    },

    #[error(transparent)]
    ImplementationError {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl From<reqwest::Error> for GitHubError {
    fn from(e: reqwest::Error) -> Self {
        GitHubError::HttpError { source: e }
    }
}

impl From<http::header::InvalidHeaderValue> for GitHubError {
    fn from(e: http::header::InvalidHeaderValue) -> Self {
        GitHubError::InvalidHeaderValue { source: e }
    }
}

impl From<GitHubError> for ApiError {
    fn from(e: GitHubError) -> Self {
        match e {
            GitHubError::MergeError {
                pr_number,
                repository_path,
                reason,
            } => ApiError::MergeError {
                pr_number,
                repository_path,
                reason,
            },
            e => ApiError::ImplementationError { source: e.into() },
        }
    }
}
