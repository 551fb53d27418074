use thiserror::Error;

/// Process error.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Could not spawn command `{command}`: {source}")]
    SpawnFailed {
        command: String,
        source: std::io::Error,
    },

    #[error(
        "Command `{command}` failed with exit code {}: {output}",
        exit_code.map(|c| c.to_string()).unwrap_or_else(|| "none".into())
    )]
    Failed {
        command: String,
        exit_code: Option<i32>,
        output: String,
    },
}

impl ProcessError {
    /// Exit code of a failed command, if it exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::SpawnFailed { .. } => None,
            Self::Failed { exit_code, .. } => *exit_code,
        }
    }

    /// Combined output of a failed command.
    pub fn output(&self) -> &str {
        match self {
            Self::SpawnFailed { .. } => "",
            Self::Failed { output, .. } => output,
        }
    }
}

/// Git error.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum GitError {
    #[error("Git command failed: {source}")]
    ProcessError { source: ProcessError },
}

impl From<ProcessError> for GitError {
    fn from(e: ProcessError) -> Self {
        Self::ProcessError { source: e }
    }
}

/// Result alias for `GitError`.
pub type Result<T, E = GitError> = core::result::Result<T, E>;
