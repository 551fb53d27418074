use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::errors::ProcessError;

const REDACTED: &str = "***";
const CREDENTIAL_MARKER: &str = "x-access-token:";

/// Runs external programs.
#[cfg_attr(any(test, feature = "testkit"), mockall::automock)]
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run a program in a directory and wait for its completion.
    ///
    /// Returns the trimmed standard output on success.
    async fn run(&self, dir: &Path, program: &str, args: &[String]) -> Result<String, ProcessError>;
}

/// Process runner backed by `tokio::process`.
#[derive(Clone, Default)]
pub struct TokioProcessRunner {
    _private: (),
}

impl TokioProcessRunner {
    /// Creates a new process runner.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(
        &self,
        dir: &Path,
        program: &str,
        args: &[String],
    ) -> Result<String, ProcessError> {
        let command = display_command(program, args);
        debug!(command = %command, dir = %dir.display(), message = "Running command");

        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .await
            .map_err(|e| ProcessError::SpawnFailed {
                command: command.clone(),
                source: e,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if output.status.success() {
            Ok(stdout.trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ProcessError::Failed {
                command,
                exit_code: output.status.code(),
                output: format!("{}\n{}", stdout.trim(), stderr.trim())
                    .trim()
                    .to_string(),
            })
        }
    }
}

/// Render a command line for logs and errors, hiding embedded credentials.
pub(crate) fn display_command(program: &str, args: &[String]) -> String {
    let mut parts = vec![program.to_string()];
    parts.extend(args.iter().map(|arg| {
        if arg.contains(CREDENTIAL_MARKER) {
            REDACTED.to_string()
        } else {
            arg.clone()
        }
    }));

    parts.join(" ")
}
