use std::time::{Duration, Instant};

use async_trait::async_trait;
use mergebot_git::GitService;
use shaku::{Component, Interface};
use tracing::debug;

use crate::{CoreContext, DomainError, Result};

#[cfg_attr(any(test, feature = "testkit"), mockall::automock)]
#[async_trait]
pub trait LocateMergeBaseInterface: Interface {
    /// Find the merge base between `HEAD` and a remote branch, deepening
    /// the shallow local history until it can be trusted.
    async fn run<'a>(
        &self,
        ctx: &CoreContext<'a>,
        branch: &str,
        timeout: Duration,
    ) -> Result<String>;
}

#[derive(Component)]
#[shaku(interface = LocateMergeBaseInterface)]
pub(crate) struct LocateMergeBase;

/// Merge base of every ref, reduced pairwise from left to right.
pub async fn merge_base_of_all(git_service: &dyn GitService, refs: &[String]) -> Result<String> {
    let (first, rest) = refs.split_first().ok_or_else(|| DomainError::InvalidInput {
        message: "cannot compute the merge base of an empty ref list".into(),
    })?;

    let mut base = first.clone();
    for reference in rest {
        base = git_service
            .merge_base(&base, reference)
            .await?
            .ok_or_else(|| DomainError::MergeBaseNotFound {
                refs: refs.to_vec(),
            })?;
    }

    Ok(base)
}

impl LocateMergeBase {
    /// One lookup against the current history, `None` when it is too shallow.
    async fn try_locate(git_service: &dyn GitService, remote_ref: &str) -> Result<Option<String>> {
        let base = match git_service.merge_base("HEAD", remote_ref).await? {
            Some(base) => base,
            None => return Ok(None),
        };

        let mut bases = vec![base];
        let side_parents = git_service
            .merge_side_parents(&format!("{remote_ref}..HEAD"))
            .await?;
        for parent in side_parents {
            match git_service.merge_base(&parent, remote_ref).await? {
                Some(parent_base) => bases.push(parent_base),
                None => {
                    debug!(parent = %parent, message = "Side parent history is truncated");
                    return Ok(None);
                }
            }
        }

        match merge_base_of_all(git_service, &bases).await {
            Ok(base) => Ok(Some(base)),
            Err(DomainError::MergeBaseNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl LocateMergeBaseInterface for LocateMergeBase {
    #[tracing::instrument(skip(self, ctx), ret)]
    async fn run<'a>(
        &self,
        ctx: &CoreContext<'a>,
        branch: &str,
        timeout: Duration,
    ) -> Result<String> {
        let remote = &ctx.config.git.remote;
        let remote_ref = format!("{remote}/{branch}");
        let started_at = Instant::now();

        loop {
            if let Some(base) = Self::try_locate(ctx.git_service, &remote_ref).await? {
                return Ok(base);
            }

            if started_at.elapsed() >= timeout {
                return Err(DomainError::TimeoutExceeded {
                    branch: branch.into(),
                    timeout_ms: timeout.as_millis(),
                });
            }

            debug!(
                branch = %branch,
                increment = ctx.config.git.deepen_increment,
                message = "Deepening history"
            );
            ctx.git_service
                .fetch_deepen(remote, ctx.config.git.deepen_increment)
                .await?;
        }
    }
}
