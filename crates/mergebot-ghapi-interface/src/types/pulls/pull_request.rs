use serde::{Deserialize, Serialize};

use super::{GhMergeableState, GhPullRequestState};
use crate::types::common::{GhBranch, GhLabel, GhUser};

/// GitHub Pull request.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct GhPullRequest {
    /// Number.
    pub number: u64,
    /// State.
    pub state: GhPullRequestState,
    /// Title.
    pub title: String,
    /// User.
    pub user: GhUser,
    /// Body.
    pub body: Option<String>,
    /// Labels.
    pub labels: Vec<GhLabel>,
    /// Draft.
    pub draft: bool,
    /// Head branch.
    pub head: GhBranch,
    /// Base branch.
    pub base: GhBranch,
    /// Merged?
    pub merged: Option<bool>,
    /// Mergeable? `None` while GitHub is still computing it.
    pub mergeable: Option<bool>,
    /// Mergeable state.
    pub mergeable_state: GhMergeableState,
}

impl GhPullRequest {
    /// Mergeability verdict, `Unknown` until GitHub computed it.
    pub fn mergeability(&self) -> GhMergeableState {
        match self.mergeable {
            None => GhMergeableState::Unknown,
            Some(_) => self.mergeable_state,
        }
    }

    /// Label names.
    pub fn label_names(&self) -> Vec<&str> {
        self.labels.iter().map(|l| l.name.as_str()).collect()
    }
}

/// GitHub Pull request short format, as returned by listings.
#[derive(Debug, Deserialize, Serialize, Default, PartialEq, Eq, Clone)]
#[serde(default)]
pub struct GhPullRequestShort {
    /// Number.
    pub number: u64,
    /// Head branch.
    pub head: GhBranch,
    /// Base branch.
    pub base: GhBranch,
}
