use serde::{Deserialize, Serialize};

use crate::types::{GhCommitStatusState, GhRepository};

/// Commit reference of a status event branch.
#[derive(Debug, Deserialize, Serialize, Default, Clone, Eq, PartialEq)]
pub struct GhStatusCommit {
    /// SHA.
    pub sha: String,
}

/// Branch containing the commit of a status event.
#[derive(Debug, Deserialize, Serialize, Default, Clone, Eq, PartialEq)]
pub struct GhStatusBranch {
    /// Branch name.
    pub name: String,
    /// Branch head.
    pub commit: GhStatusCommit,
}

/// GitHub commit status event.
#[derive(Debug, Deserialize, Serialize, Default, Clone, Eq, PartialEq)]
pub struct GhStatusEvent {
    /// Commit SHA.
    pub sha: String,
    /// Status state.
    pub state: GhCommitStatusState,
    /// Status context.
    pub context: String,
    /// Branches containing the commit.
    #[serde(default)]
    pub branches: Vec<GhStatusBranch>,
    /// Repository.
    pub repository: GhRepository,
}

impl GhStatusEvent {
    /// Branches whose head is the event commit.
    pub fn head_branches(&self) -> impl Iterator<Item = &str> {
        self.branches
            .iter()
            .filter(move |b| b.commit.sha == self.sha)
            .map(|b| b.name.as_str())
    }
}
