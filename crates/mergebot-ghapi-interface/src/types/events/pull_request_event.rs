use serde::{Deserialize, Serialize};

use crate::types::{GhPullRequest, GhRepository, GhUser};

/// GitHub Pull request action.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GhPullRequestAction {
    /// Opened.
    #[default]
    Opened,
    /// Reopened.
    Reopened,
    /// Synchronize.
    Synchronize,
    /// Labeled.
    Labeled,
    /// Unlabeled.
    Unlabeled,
    /// Edited.
    Edited,
    /// Ready for review.
    ReadyForReview,
    /// Closed.
    Closed,
    /// Any other action.
    #[serde(other)]
    Other,
}

/// GitHub Pull request event.
#[derive(Debug, Deserialize, Serialize, Default, Clone, Eq, PartialEq)]
pub struct GhPullRequestEvent {
    /// Action.
    pub action: GhPullRequestAction,
    /// Number.
    pub number: u64,
    /// Pull request.
    pub pull_request: GhPullRequest,
    /// Repository.
    pub repository: GhRepository,
    /// Sender.
    #[serde(default)]
    pub sender: GhUser,
}
