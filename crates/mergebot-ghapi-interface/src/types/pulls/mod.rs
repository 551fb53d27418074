mod merge_strategy;
mod mergeable_state;
mod pull_request;
mod pull_request_filter;
mod pull_request_state;

pub use merge_strategy::GhMergeStrategy;
pub use mergeable_state::GhMergeableState;
pub use pull_request::{GhPullRequest, GhPullRequestShort};
pub use pull_request_filter::GhPullRequestFilter;
pub use pull_request_state::GhPullRequestState;
