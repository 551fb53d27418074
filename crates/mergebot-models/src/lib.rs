//! Domain models.

mod branch_kind;
mod merge_strategy;
mod pull_request_handle;
mod repository_path;

pub use branch_kind::BranchKind;
pub use merge_strategy::{MergeStrategy, MergeStrategyError};
pub use pull_request_handle::{PullRequestHandle, PullRequestHandleError};
pub use repository_path::{RepositoryPath, RepositoryPathError};
