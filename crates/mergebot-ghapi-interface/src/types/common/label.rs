use serde::{Deserialize, Serialize};

/// GitHub Label.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct GhLabel {
    /// Name.
    pub name: String,
}

impl From<&str> for GhLabel {
    fn from(name: &str) -> Self {
        Self { name: name.into() }
    }
}
