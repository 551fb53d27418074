mod common;
mod events;
mod pulls;
mod statuses;

pub use common::{GhBranch, GhLabel, GhRepository, GhUser};
pub use events::{
    GhPullRequestAction, GhPullRequestEvent, GhPushEvent, GhReview, GhReviewEvent,
    GhStatusBranch, GhStatusCommit, GhStatusEvent,
};
pub use pulls::{
    GhMergeStrategy, GhMergeableState, GhPullRequest, GhPullRequestFilter, GhPullRequestShort,
    GhPullRequestState,
};
pub use statuses::{GhCommitStatusItem, GhCommitStatusState};
