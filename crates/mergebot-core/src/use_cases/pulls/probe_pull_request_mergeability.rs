use std::time::Duration;

use async_trait::async_trait;
use mergebot_ghapi_interface::types::{GhMergeableState, GhPullRequest};
use mergebot_models::PullRequestHandle;
use shaku::{Component, Interface};
use tracing::debug;

use crate::{CoreContext, Result};

#[cfg_attr(any(test, feature = "testkit"), mockall::automock)]
#[async_trait]
pub trait ProbePullRequestMergeabilityInterface: Interface {
    async fn run<'a>(
        &self,
        ctx: &CoreContext<'a>,
        pr_handle: &PullRequestHandle,
        max_retries: u32,
    ) -> Result<GhPullRequest>;
}

/// Polls a pull request until the platform reports a clean verdict.
///
/// The last observed state is returned once retries are exhausted, so
/// callers must treat non-clean states as a skip.
#[derive(Component)]
#[shaku(interface = ProbePullRequestMergeabilityInterface)]
pub(crate) struct ProbePullRequestMergeability;

#[async_trait]
impl ProbePullRequestMergeabilityInterface for ProbePullRequestMergeability {
    #[tracing::instrument(skip(self, ctx), fields(pr_handle = %pr_handle))]
    async fn run<'a>(
        &self,
        ctx: &CoreContext<'a>,
        pr_handle: &PullRequestHandle,
        max_retries: u32,
    ) -> Result<GhPullRequest> {
        let delay = Duration::from_millis(ctx.config.merge.probe_delay);
        let mut retries_left = max_retries;

        loop {
            let upstream_pr = ctx
                .api_service
                .pulls_get(pr_handle.owner(), pr_handle.name(), pr_handle.number())
                .await?;

            let verdict = upstream_pr.mergeability();
            if verdict == GhMergeableState::Clean || retries_left == 0 {
                return Ok(upstream_pr);
            }

            debug!(
                pr_number = pr_handle.number(),
                verdict = %verdict,
                retries_left = retries_left,
                message = "Mergeability not settled, waiting"
            );

            retries_left -= 1;
            ctx.sleep_service.sleep_for_duration(delay).await;
        }
    }
}
