use std::time::Duration;

use async_trait::async_trait;
use mergebot_ghapi_interface::types::GhMergeStrategy;
use mergebot_models::{MergeStrategy, PullRequestHandle};
use shaku::{Component, Interface};
use tracing::{info, warn};

use crate::CoreContext;

#[cfg_attr(any(test, feature = "testkit"), mockall::automock)]
#[async_trait]
pub trait TryMergePullRequestInterface: Interface {
    /// Merge a pull request pinned to `head_sha`, retrying on failure.
    ///
    /// Returns `false` once every attempt failed.
    async fn run<'a>(
        &self,
        ctx: &CoreContext<'a>,
        pr_handle: &PullRequestHandle,
        head_sha: &str,
        merge_strategy: MergeStrategy,
        commit_title: &str,
    ) -> bool;
}

#[derive(Component)]
#[shaku(interface = TryMergePullRequestInterface)]
pub(crate) struct TryMergePullRequest;

impl TryMergePullRequest {
    fn convert_strategy_for_github(strategy: MergeStrategy) -> GhMergeStrategy {
        match strategy {
            MergeStrategy::Merge => GhMergeStrategy::Merge,
            MergeStrategy::Rebase => GhMergeStrategy::Rebase,
            MergeStrategy::Squash => GhMergeStrategy::Squash,
        }
    }
}

#[async_trait]
impl TryMergePullRequestInterface for TryMergePullRequest {
    #[tracing::instrument(skip(self, ctx), fields(pr_handle = %pr_handle))]
    async fn run<'a>(
        &self,
        ctx: &CoreContext<'a>,
        pr_handle: &PullRequestHandle,
        head_sha: &str,
        merge_strategy: MergeStrategy,
        commit_title: &str,
    ) -> bool {
        let attempts = ctx.config.merge.attempt_retries + 1;
        let delay = Duration::from_millis(ctx.config.merge.attempt_delay);

        for attempt in 1..=attempts {
            let result = ctx
                .api_service
                .pulls_merge(
                    pr_handle.owner(),
                    pr_handle.name(),
                    pr_handle.number(),
                    commit_title,
                    "",
                    Self::convert_strategy_for_github(merge_strategy),
                    head_sha,
                )
                .await;

            match result {
                Ok(()) => {
                    info!(
                        owner = %pr_handle.owner(),
                        name = %pr_handle.name(),
                        pr_number = pr_handle.number(),
                        merge_strategy = %merge_strategy,
                        message = "Pull request merged"
                    );
                    return true;
                }
                Err(e) => {
                    warn!(
                        owner = %pr_handle.owner(),
                        name = %pr_handle.name(),
                        pr_number = pr_handle.number(),
                        attempt = attempt,
                        attempts = attempts,
                        error = %e,
                        message = "Merge attempt failed"
                    );
                }
            }

            if attempt < attempts {
                ctx.sleep_service.sleep_for_duration(delay).await;
            }
        }

        false
    }
}
