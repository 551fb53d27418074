use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::{
    errors::{ProcessError, Result},
    runner::ProcessRunner,
};

const GIT_PROGRAM: &str = "git";
/// `git merge --abort` exit code when no merge is in progress.
const NO_MERGE_TO_ABORT_EXIT_CODE: i32 = 128;
/// `git merge-base` exit code when refs share no history.
const NO_MERGE_BASE_EXIT_CODE: i32 = 1;
/// `git config --unset-all` exit code when the key is absent.
const CONFIG_KEY_ABSENT_EXIT_CODE: i32 = 5;
/// `git merge` exit code when the merge stopped on conflicts.
const MERGE_CONFLICT_EXIT_CODE: i32 = 1;

/// Result of an exploratory merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Merge applied without conflict.
    Clean,
    /// Merge failed, with the command output.
    Conflict(String),
}

/// Git primitives against a local clone.
#[cfg_attr(any(test, feature = "testkit"), mockall::automock)]
#[async_trait]
pub trait GitService: Send + Sync {
    /// Check out a local branch.
    async fn checkout(&self, branch: &str) -> Result<()>;
    /// Pull a remote branch into the current branch, without committing.
    async fn pull(&self, remote: &str, branch: &str) -> Result<()>;
    /// Fetch a branch with a bounded depth, updating its remote-tracking ref.
    async fn fetch(&self, remote: &str, branch: &str, depth: u32) -> Result<()>;
    /// Deepen the local history by `increment` commits.
    async fn fetch_deepen(&self, remote: &str, increment: u32) -> Result<()>;
    /// Merge a reference without committing, reporting conflicts as a value.
    ///
    /// Fatal git errors (unrelated histories, unknown reference) are errors, not conflicts.
    async fn merge_no_commit(&self, reference: &str) -> Result<MergeOutcome>;
    /// Merge a reference with a merge commit.
    async fn merge(&self, reference: &str, message: &str) -> Result<()>;
    /// Abort the merge in progress, if any.
    async fn merge_abort(&self) -> Result<()>;
    /// Best common ancestor of two refs, `None` when they share no history.
    async fn merge_base(&self, first: &str, second: &str) -> Result<Option<String>>;
    /// Non-first parents of every merge commit in a revision range.
    async fn merge_side_parents(&self, range: &str) -> Result<Vec<String>>;
    /// Change a remote URL.
    async fn remote_set_url(&self, remote: &str, url: &str) -> Result<()>;
    /// Remove every value of a config key, absent keys included.
    async fn config_unset(&self, key: &str) -> Result<()>;
    /// Set a config value.
    async fn config_set(&self, key: &str, value: &str) -> Result<()>;
    /// Push a branch.
    async fn push(&self, remote: &str, branch: &str, force_with_lease: bool) -> Result<()>;
}

/// Git service running the `git` program in a working directory.
pub struct ProcessGitService<R> {
    workdir: PathBuf,
    runner: R,
}

impl<R: ProcessRunner> ProcessGitService<R> {
    /// Creates a git service for a working directory.
    pub fn new<P: AsRef<Path>>(workdir: P, runner: R) -> Self {
        Self {
            workdir: workdir.as_ref().to_path_buf(),
            runner,
        }
    }

    async fn git(&self, args: &[&str]) -> Result<String, ProcessError> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        self.runner.run(&self.workdir, GIT_PROGRAM, &args).await
    }
}

fn parse_side_parents(rev_list: &str) -> Vec<String> {
    rev_list
        .lines()
        .flat_map(|line| line.split_whitespace().skip(2))
        .map(Into::into)
        .collect()
}

#[async_trait]
impl<R: ProcessRunner> GitService for ProcessGitService<R> {
    #[tracing::instrument(skip(self))]
    async fn checkout(&self, branch: &str) -> Result<()> {
        self.git(&["checkout", branch]).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn pull(&self, remote: &str, branch: &str) -> Result<()> {
        self.git(&["pull", "--no-commit", remote, branch]).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch(&self, remote: &str, branch: &str, depth: u32) -> Result<()> {
        let depth = format!("--depth={depth}");
        let refspec = format!("+refs/heads/{branch}:refs/remotes/{remote}/{branch}");
        self.git(&["fetch", &depth, remote, &refspec]).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_deepen(&self, remote: &str, increment: u32) -> Result<()> {
        let deepen = format!("--deepen={increment}");
        self.git(&["fetch", &deepen, remote]).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn merge_no_commit(&self, reference: &str) -> Result<MergeOutcome> {
        match self
            .git(&["merge", "--no-commit", "--no-ff", reference])
            .await
        {
            Ok(_) => Ok(MergeOutcome::Clean),
            Err(ProcessError::Failed {
                exit_code: Some(MERGE_CONFLICT_EXIT_CODE),
                output,
                ..
            }) => Ok(MergeOutcome::Conflict(output)),
            Err(e) => Err(e.into()),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn merge(&self, reference: &str, message: &str) -> Result<()> {
        self.git(&["merge", "--no-ff", "-m", message, reference])
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn merge_abort(&self) -> Result<()> {
        match self.git(&["merge", "--abort"]).await {
            Ok(_) => Ok(()),
            Err(e) if e.exit_code() == Some(NO_MERGE_TO_ABORT_EXIT_CODE) => {
                debug!(message = "No merge in progress");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    #[tracing::instrument(skip(self), ret)]
    async fn merge_base(&self, first: &str, second: &str) -> Result<Option<String>> {
        match self.git(&["merge-base", first, second]).await {
            Ok(output) if output.is_empty() => Ok(None),
            Ok(output) => Ok(Some(output)),
            Err(e) if e.exit_code() == Some(NO_MERGE_BASE_EXIT_CODE) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[tracing::instrument(skip(self), ret)]
    async fn merge_side_parents(&self, range: &str) -> Result<Vec<String>> {
        let output = self
            .git(&["rev-list", "--merges", "--parents", range])
            .await?;
        Ok(parse_side_parents(&output))
    }

    #[tracing::instrument(skip(self, url))]
    async fn remote_set_url(&self, remote: &str, url: &str) -> Result<()> {
        self.git(&["remote", "set-url", remote, url]).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn config_unset(&self, key: &str) -> Result<()> {
        match self.git(&["config", "--unset-all", key]).await {
            Ok(_) => Ok(()),
            Err(e) if e.exit_code() == Some(CONFIG_KEY_ABSENT_EXIT_CODE) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn config_set(&self, key: &str, value: &str) -> Result<()> {
        self.git(&["config", key, value]).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn push(&self, remote: &str, branch: &str, force_with_lease: bool) -> Result<()> {
        if force_with_lease {
            self.git(&["push", "--force-with-lease", remote, branch])
                .await?;
        } else {
            self.git(&["push", remote, branch]).await?;
        }

        Ok(())
    }
}
