use serde::{Deserialize, Serialize};

use crate::types::{GhPullRequest, GhRepository};

/// GitHub Review, only its state matters here.
#[derive(Debug, Deserialize, Serialize, Default, Clone, Eq, PartialEq)]
#[serde(default)]
pub struct GhReview {
    /// Review state, as sent by GitHub (`approved`, `changes_requested`, ...).
    pub state: String,
}

/// GitHub Pull request review event.
#[derive(Debug, Deserialize, Serialize, Default, Clone, Eq, PartialEq)]
pub struct GhReviewEvent {
    /// Action.
    pub action: String,
    /// Review.
    #[serde(default)]
    pub review: GhReview,
    /// Pull request.
    pub pull_request: GhPullRequest,
    /// Repository.
    pub repository: GhRepository,
}
