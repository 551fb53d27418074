use serde::{Deserialize, Serialize};

/// GitHub Merge strategy.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GhMergeStrategy {
    /// Merge
    Merge,
    /// Squash
    Squash,
    /// Rebase
    Rebase,
}

serde_plain::derive_display_from_serialize!(GhMergeStrategy);
