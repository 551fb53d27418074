use async_trait::async_trait;
use mergebot_ghapi_interface::types::{GhCommitStatusState, GhPullRequest};
use mergebot_git::MergeOutcome;
use mergebot_models::PullRequestHandle;
use shaku::{Component, Interface};
use tracing::info;

use crate::{CoreContext, Result};

/// Result of a rollup conflict check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollupCheck {
    /// The head branch merges cleanly into the main branch.
    NoConflict,
    /// New conflict, reported with a status and a comment.
    Conflict(String),
    /// Conflict already reported on the head commit by a previous run.
    AlreadyReported(String),
}

#[cfg_attr(any(test, feature = "testkit"), mockall::automock)]
#[async_trait]
pub trait CheckRollupConflictInterface: Interface {
    /// Check whether the pull request head merges cleanly into the main branch.
    ///
    /// On conflict, a failure status is posted on the head commit. The
    /// reconciliation comment is only posted when the previous status was not
    /// already failing.
    async fn run<'a>(
        &self,
        ctx: &CoreContext<'a>,
        pr_handle: &PullRequestHandle,
        upstream_pr: &GhPullRequest,
    ) -> Result<RollupCheck>;
}

#[derive(Component)]
#[shaku(interface = CheckRollupConflictInterface)]
pub(crate) struct CheckRollupConflict;

impl CheckRollupConflict {
    fn status_description(main_branch: &str) -> String {
        format!(
            "Conflicts with {main_branch}. Merge this branch into {main_branch} through a new pull request first."
        )
    }

    fn reconciliation_comment(
        main_branch: &str,
        head_branch: &str,
        fix_branch_prefix: &str,
        automerge_label: &str,
        conflict: &str,
    ) -> String {
        let fix_branch = format!("{fix_branch_prefix}/{head_branch}");

        format!(
            "This pull request targets a release branch, and its changes must also land on `{main_branch}`.\n\
            Merging `{head_branch}` into `{main_branch}` conflicts, so this pull request will not be merged automatically.\n\
            \n\
            To reconcile the branches:\n\
            \n\
            ```bash\n\
            git fetch origin\n\
            git checkout -b {fix_branch} origin/{main_branch}\n\
            git merge origin/{head_branch}\n\
            # resolve the conflicts, then commit\n\
            git push origin {fix_branch}\n\
            ```\n\
            \n\
            Then open a pull request from `{fix_branch}` into `{main_branch}` with the `{automerge_label}` label. \
            Once it is merged, this pull request can be merged again.\n\
            \n\
            <details>\n\
            <summary>Conflict output</summary>\n\
            \n\
            ```\n\
            {conflict}\n\
            ```\n\
            </details>"
        )
    }
}

#[async_trait]
impl CheckRollupConflictInterface for CheckRollupConflict {
    #[tracing::instrument(
        skip(self, ctx, upstream_pr),
        fields(pr_handle = %pr_handle, head = %upstream_pr.head.reference)
    )]
    async fn run<'a>(
        &self,
        ctx: &CoreContext<'a>,
        pr_handle: &PullRequestHandle,
        upstream_pr: &GhPullRequest,
    ) -> Result<RollupCheck> {
        let remote = &ctx.config.git.remote;
        let main_branch = &ctx.config.merge.main_branch;
        let head_branch = &upstream_pr.head.reference;
        let head_sha = &upstream_pr.head.sha;

        ctx.git_service.checkout(main_branch).await?;
        ctx.git_service.pull(remote, main_branch).await?;
        ctx.git_service
            .fetch(remote, head_branch, ctx.config.git.fetch_depth)
            .await?;

        let outcome = ctx
            .git_service
            .merge_no_commit(&format!("{remote}/{head_branch}"))
            .await;
        // The merge was exploratory either way.
        ctx.git_service.merge_abort().await?;

        let conflict = match outcome? {
            MergeOutcome::Clean => return Ok(RollupCheck::NoConflict),
            MergeOutcome::Conflict(output) => output,
        };

        info!(
            owner = %pr_handle.owner(),
            name = %pr_handle.name(),
            pr_number = pr_handle.number(),
            head_branch = %head_branch,
            main_branch = %main_branch,
            message = "Rollup conflict detected"
        );

        let context = &ctx.config.merge.status_context;
        ctx.api_service
            .commit_statuses_update(
                pr_handle.owner(),
                pr_handle.name(),
                head_sha,
                GhCommitStatusState::Failure,
                context,
                &Self::status_description(main_branch),
            )
            .await?;

        let mut statuses: Vec<_> = ctx
            .api_service
            .commit_statuses_list(pr_handle.owner(), pr_handle.name(), head_sha)
            .await?
            .into_iter()
            .filter(|s| &s.context == context)
            .collect();
        statuses.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        // The first entry is the status posted above.
        let already_reported = statuses.len() > 1 && statuses[1].state.is_failing();
        if already_reported {
            info!(
                pr_number = pr_handle.number(),
                message = "Conflict already reported, skipping comment"
            );

            Ok(RollupCheck::AlreadyReported(conflict))
        } else {
            ctx.api_service
                .comments_post(
                    pr_handle.owner(),
                    pr_handle.name(),
                    pr_handle.number(),
                    &Self::reconciliation_comment(
                        main_branch,
                        head_branch,
                        &ctx.config.merge.fix_branch_prefix,
                        &ctx.config.merge.automerge_label,
                        &conflict,
                    ),
                )
                .await?;

            Ok(RollupCheck::Conflict(conflict))
        }
    }
}

#[cfg(test)]
mod tests {
    use mergebot_ghapi_interface::types::{GhBranch, GhCommitStatusItem};
    use mergebot_git::{GitError, ProcessError};
    use mockall::Sequence;
    use pretty_assertions::assert_eq;
    use time::OffsetDateTime;

    use super::*;
    use crate::context::tests::CoreContextTest;

    const CONFLICT: &str = "CONFLICT (content): Merge conflict in src/lib.rs";

    fn upstream_pr() -> GhPullRequest {
        GhPullRequest {
            number: 1,
            head: GhBranch {
                reference: "releases/2024-01".into(),
                sha: "abcdef".into(),
                ..Default::default()
            },
            base: GhBranch {
                reference: "releases/2024-01-base".into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn status(state: GhCommitStatusState, context: &str, timestamp: i64) -> GhCommitStatusItem {
        let date = OffsetDateTime::from_unix_timestamp(timestamp).unwrap();
        GhCommitStatusItem {
            state,
            context: context.into(),
            description: None,
            created_at: date,
            updated_at: date,
        }
    }

    fn arrange_git(ctx: &mut CoreContextTest, outcome: mergebot_git::Result<MergeOutcome>) {
        let mut seq = Sequence::new();
        ctx.git_service
            .expect_checkout()
            .once()
            .in_sequence(&mut seq)
            .withf(|branch| branch == "master")
            .returning(|_| Ok(()));
        ctx.git_service
            .expect_pull()
            .once()
            .in_sequence(&mut seq)
            .withf(|remote, branch| remote == "origin" && branch == "master")
            .returning(|_, _| Ok(()));
        ctx.git_service
            .expect_fetch()
            .once()
            .in_sequence(&mut seq)
            .withf(|remote, branch, depth| {
                remote == "origin" && branch == "releases/2024-01" && depth == &50
            })
            .returning(|_, _, _| Ok(()));
        ctx.git_service
            .expect_merge_no_commit()
            .once()
            .in_sequence(&mut seq)
            .withf(|reference| reference == "origin/releases/2024-01")
            .return_once(move |_| outcome);
        ctx.git_service
            .expect_merge_abort()
            .once()
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
    }

    #[tokio::test]
    async fn clean_merge() {
        let mut ctx = CoreContextTest::new();
        arrange_git(&mut ctx, Ok(MergeOutcome::Clean));
        ctx.api_service.expect_commit_statuses_update().never();
        ctx.api_service.expect_comments_post().never();

        let result = CheckRollupConflict
            .run(&ctx.as_context(), &("me", "test", 1).into(), &upstream_pr())
            .await
            .unwrap();

        assert_eq!(result, RollupCheck::NoConflict);
    }

    #[tokio::test]
    async fn first_conflict_is_commented() {
        let mut ctx = CoreContextTest::new();
        arrange_git(&mut ctx, Ok(MergeOutcome::Conflict(CONFLICT.into())));
        ctx.api_service
            .expect_commit_statuses_update()
            .once()
            .withf(|owner, name, git_ref, state, context, _| {
                owner == "me"
                    && name == "test"
                    && git_ref == "abcdef"
                    && *state == GhCommitStatusState::Failure
                    && context == "mergebot/rollup"
            })
            .returning(|_, _, _, _, _, _| Ok(()));
        ctx.api_service
            .expect_commit_statuses_list()
            .once()
            .returning(|_, _, _| {
                Ok(vec![
                    status(GhCommitStatusState::Failure, "mergebot/rollup", 2_000),
                    status(GhCommitStatusState::Failure, "ci/build", 1_500),
                ])
            });
        ctx.api_service
            .expect_comments_post()
            .once()
            .withf(|_, _, number, body| {
                number == &1
                    && body.contains(
                        "git checkout -b fix-rollup-conflict/releases/2024-01 origin/master",
                    )
                    && body.contains(CONFLICT)
            })
            .returning(|_, _, _, _| Ok(1));

        let result = CheckRollupConflict
            .run(&ctx.as_context(), &("me", "test", 1).into(), &upstream_pr())
            .await
            .unwrap();

        assert_eq!(result, RollupCheck::Conflict(CONFLICT.into()));
    }

    #[tokio::test]
    async fn repeated_conflict_is_not_commented_again() {
        let mut ctx = CoreContextTest::new();
        arrange_git(&mut ctx, Ok(MergeOutcome::Conflict(CONFLICT.into())));
        ctx.api_service
            .expect_commit_statuses_update()
            .once()
            .returning(|_, _, _, _, _, _| Ok(()));
        ctx.api_service
            .expect_commit_statuses_list()
            .once()
            .returning(|_, _, _| {
                Ok(vec![
                    status(GhCommitStatusState::Failure, "mergebot/rollup", 1_000),
                    status(GhCommitStatusState::Failure, "mergebot/rollup", 2_000),
                ])
            });
        ctx.api_service.expect_comments_post().never();

        let result = CheckRollupConflict
            .run(&ctx.as_context(), &("me", "test", 1).into(), &upstream_pr())
            .await
            .unwrap();

        assert_eq!(result, RollupCheck::AlreadyReported(CONFLICT.into()));
    }

    #[tokio::test]
    async fn conflict_after_success_is_commented() {
        let mut ctx = CoreContextTest::new();
        arrange_git(&mut ctx, Ok(MergeOutcome::Conflict(CONFLICT.into())));
        ctx.api_service
            .expect_commit_statuses_update()
            .once()
            .returning(|_, _, _, _, _, _| Ok(()));
        ctx.api_service
            .expect_commit_statuses_list()
            .once()
            .returning(|_, _, _| {
                Ok(vec![
                    status(GhCommitStatusState::Failure, "mergebot/rollup", 2_000),
                    status(GhCommitStatusState::Success, "mergebot/rollup", 1_000),
                ])
            });
        ctx.api_service
            .expect_comments_post()
            .once()
            .returning(|_, _, _, _| Ok(1));

        CheckRollupConflict
            .run(&ctx.as_context(), &("me", "test", 1).into(), &upstream_pr())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn fatal_merge_error_is_not_reported_as_conflict() {
        let mut ctx = CoreContextTest::new();
        arrange_git(
            &mut ctx,
            Err(GitError::from(ProcessError::Failed {
                command: "git merge".into(),
                exit_code: Some(128),
                output: "fatal: refusing to merge unrelated histories".into(),
            })),
        );
        ctx.api_service.expect_commit_statuses_update().never();
        ctx.api_service.expect_comments_post().never();

        let result = CheckRollupConflict
            .run(&ctx.as_context(), &("me", "test", 1).into(), &upstream_pr())
            .await;

        assert!(matches!(result, Err(crate::DomainError::GitError { .. })));
    }
}
