use std::time::Duration;

use async_trait::async_trait;
use mergebot_ghapi_interface::types::GhPullRequest;
use mergebot_models::PullRequestHandle;
use shaku::{Component, HasComponent, Interface};
use tracing::info;

use super::LocateMergeBaseInterface;
use crate::{CoreContext, Result};

#[cfg_attr(any(test, feature = "testkit"), mockall::automock)]
#[async_trait]
pub trait RollReleaseIntoMainInterface: Interface {
    /// Merge the pull request head into the main branch and push it.
    ///
    /// Expects the main branch to be checked out and up to date. The merge base
    /// is located first: the search deepens the shallow clone until both
    /// branches share an ancestor, which the merge needs.
    async fn run<'a>(
        &self,
        ctx: &CoreContext<'a>,
        pr_handle: &PullRequestHandle,
        upstream_pr: &GhPullRequest,
    ) -> Result<()>;
}

#[derive(Component)]
#[shaku(interface = RollReleaseIntoMainInterface)]
pub(crate) struct RollReleaseIntoMain;

#[async_trait]
impl RollReleaseIntoMainInterface for RollReleaseIntoMain {
    #[tracing::instrument(skip(self, ctx, upstream_pr), fields(pr_handle = %pr_handle))]
    async fn run<'a>(
        &self,
        ctx: &CoreContext<'a>,
        pr_handle: &PullRequestHandle,
        upstream_pr: &GhPullRequest,
    ) -> Result<()> {
        let remote = &ctx.config.git.remote;
        let main_branch = &ctx.config.merge.main_branch;
        let head_branch = &upstream_pr.head.reference;

        ctx.git_service
            .config_set("user.name", &ctx.config.git.user_name)
            .await?;
        ctx.git_service
            .config_set("user.email", &ctx.config.git.user_email)
            .await?;

        let locate_merge_base: &dyn LocateMergeBaseInterface = ctx.core_module.resolve_ref();
        let merge_base = locate_merge_base
            .run(
                ctx,
                head_branch,
                Duration::from_millis(ctx.config.git.merge_base_timeout),
            )
            .await?;

        let range = format!("{merge_base}..{remote}/{head_branch}");
        info!(
            owner = %pr_handle.owner(),
            name = %pr_handle.name(),
            pr_number = pr_handle.number(),
            range = %range,
            message = "Merging release branch into main branch"
        );

        let message = format!(
            "Merge branch '{head_branch}' into {main_branch} (#{})",
            pr_handle.number()
        );
        ctx.git_service
            .merge(&format!("{remote}/{head_branch}"), &message)
            .await?;
        ctx.git_service.push(remote, main_branch, false).await?;

        info!(
            owner = %pr_handle.owner(),
            name = %pr_handle.name(),
            pr_number = pr_handle.number(),
            message = "Release branch rolled into main branch"
        );

        Ok(())
    }
}
