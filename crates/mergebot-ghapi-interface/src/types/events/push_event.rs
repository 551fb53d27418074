use serde::{Deserialize, Serialize};

use crate::types::GhRepository;

const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// GitHub Push event.
#[derive(Debug, Deserialize, Serialize, Default, Clone, Eq, PartialEq)]
pub struct GhPushEvent {
    /// Pushed reference.
    #[serde(rename = "ref")]
    pub reference: String,
    /// Previous head.
    #[serde(default)]
    pub before: String,
    /// New head.
    #[serde(default)]
    pub after: String,
    /// Repository.
    pub repository: GhRepository,
}

impl GhPushEvent {
    /// Pushed branch name, `None` for tags.
    pub fn branch_name(&self) -> Option<&str> {
        self.reference.strip_prefix(BRANCH_REF_PREFIX)
    }
}
