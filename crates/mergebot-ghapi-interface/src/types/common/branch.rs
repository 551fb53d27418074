use serde::{Deserialize, Serialize};

use super::{GhRepository, GhUser};

/// GitHub Branch, as seen from a pull request.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct GhBranch {
    /// Label.
    pub label: Option<String>,
    #[serde(rename = "ref")]
    /// Reference.
    pub reference: String,
    /// SHA.
    pub sha: String,
    /// Creator.
    pub user: Option<GhUser>,
    /// Owning repository, missing when the fork was deleted.
    pub repo: Option<GhRepository>,
}
