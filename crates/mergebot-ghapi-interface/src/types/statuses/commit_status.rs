use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use time::OffsetDateTime;

/// GitHub commit status item
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, SmartDefault)]
pub struct GhCommitStatusItem {
    pub state: GhCommitStatusState,
    pub context: String,
    #[serde(default)]
    pub description: Option<String>,
    #[default(OffsetDateTime::now_utc())]
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[default(OffsetDateTime::now_utc())]
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// GitHub commit status state
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy, SmartDefault)]
#[serde(rename_all = "snake_case")]
pub enum GhCommitStatusState {
    /// Error.
    Error,
    /// Failure.
    Failure,
    /// Pending.
    #[default]
    Pending,
    /// Success.
    Success,
}

impl GhCommitStatusState {
    /// Convert status state to static str.
    pub fn to_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Failure => "failure",
            Self::Pending => "pending",
            Self::Success => "success",
        }
    }

    /// Failing states.
    pub fn is_failing(self) -> bool {
        matches!(self, Self::Error | Self::Failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_status() {
        let status: GhCommitStatusItem = serde_json::from_str(
            r#"{
                "state": "failure",
                "context": "mergebot/rollup",
                "description": "Conflicts",
                "created_at": "2024-01-02T10:00:00Z",
                "updated_at": "2024-01-02T10:00:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(status.state, GhCommitStatusState::Failure);
        assert!(status.state.is_failing());
        assert_eq!(status.created_at.year(), 2024);
    }
}
