use serde::{Deserialize, Serialize};

/// Mergeability state, as computed asynchronously by GitHub.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GhMergeableState {
    /// Head is out of date.
    Behind,
    /// Blocked by a required check or review.
    Blocked,
    /// Mergeable, all checks passing.
    Clean,
    /// Merge conflicts.
    Dirty,
    /// Draft pull request.
    Draft,
    /// Mergeable with passing commit status and pre-receive hooks.
    HasHooks,
    /// Mergeable with non-passing commit status.
    Unstable,
    /// Not computed yet, or not recognized.
    #[default]
    #[serde(other)]
    Unknown,
}

impl GhMergeableState {
    /// States allowing a merge.
    pub fn is_mergeable(self) -> bool {
        matches!(self, Self::Clean | Self::Unstable)
    }
}

serde_plain::derive_display_from_serialize!(GhMergeableState);
