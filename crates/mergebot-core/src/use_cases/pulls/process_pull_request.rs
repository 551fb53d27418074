use async_trait::async_trait;
use mergebot_ghapi_interface::types::{GhPullRequest, GhPullRequestState};
use mergebot_models::{BranchKind, PullRequestHandle};
use shaku::{Component, HasComponent, Interface};
use tracing::{error, info, warn};

use super::{
    classify_pull_request::{Eligibility, EligibilityClassifier, MergePlan, SkipReason},
    CheckRollupConflictInterface, DropCredentialsInterface, ElevateCredentialsInterface,
    ProbePullRequestMergeabilityInterface, RollReleaseIntoMainInterface, RollupCheck,
    TryMergePullRequestInterface,
};
use crate::{CoreContext, DomainError, Result};

/// Terminal state of a pull request handling.
///
/// Merge failures are reported as [`DomainError::MergeFailed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Merged,
    Skip(SkipReason),
    /// Conflict status posted, no merge attempted.
    RollupBlocked,
}

#[cfg_attr(any(test, feature = "testkit"), mockall::automock)]
#[async_trait]
pub trait ProcessPullRequestInterface: Interface {
    async fn run<'a>(
        &self,
        ctx: &CoreContext<'a>,
        pr_handle: &PullRequestHandle,
    ) -> Result<ProcessOutcome>;
}

#[derive(Component)]
#[shaku(interface = ProcessPullRequestInterface)]
pub(crate) struct ProcessPullRequest;

impl ProcessPullRequest {
    /// Check the rollup and update the main branch, with elevated credentials.
    ///
    /// Returns the terminal outcome when a conflict stops the rollup.
    async fn roll_into_main<'a>(
        ctx: &CoreContext<'a>,
        pr_handle: &PullRequestHandle,
        upstream_pr: &GhPullRequest,
    ) -> Result<Option<ProcessOutcome>> {
        let check_rollup_conflict: &dyn CheckRollupConflictInterface =
            ctx.core_module.resolve_ref();
        match check_rollup_conflict
            .run(ctx, pr_handle, upstream_pr)
            .await?
        {
            RollupCheck::NoConflict => (),
            RollupCheck::Conflict(_) => {
                let conflict = DomainError::RollupConflict {
                    pr_number: pr_handle.number(),
                    head_branch: upstream_pr.head.reference.clone(),
                    main_branch: ctx.config.merge.main_branch.clone(),
                };
                warn!(
                    owner = %pr_handle.owner(),
                    name = %pr_handle.name(),
                    pr_number = pr_handle.number(),
                    error = %conflict,
                    message = "Rollup blocked, waiting for the conflict to be reconciled"
                );
                return Ok(Some(ProcessOutcome::RollupBlocked));
            }
            RollupCheck::AlreadyReported(_) => {
                let reason = SkipReason::RollupConflictAlreadyReported;
                info!(
                    owner = %pr_handle.owner(),
                    name = %pr_handle.name(),
                    pr_number = pr_handle.number(),
                    reason = %reason,
                    message = "Skipping pull request"
                );
                return Ok(Some(ProcessOutcome::Skip(reason)));
            }
        }

        let roll_release_into_main: &dyn RollReleaseIntoMainInterface =
            ctx.core_module.resolve_ref();
        roll_release_into_main
            .run(ctx, pr_handle, upstream_pr)
            .await?;

        Ok(None)
    }

    async fn merge<'a>(
        ctx: &CoreContext<'a>,
        pr_handle: &PullRequestHandle,
        upstream_pr: &GhPullRequest,
        plan: &MergePlan,
    ) -> Result<ProcessOutcome> {
        let try_merge_pull_request: &dyn TryMergePullRequestInterface =
            ctx.core_module.resolve_ref();
        let merged = try_merge_pull_request
            .run(
                ctx,
                pr_handle,
                &upstream_pr.head.sha,
                plan.strategy,
                &plan.commit_title,
            )
            .await;

        if merged {
            Ok(ProcessOutcome::Merged)
        } else {
            Err(DomainError::MergeFailed {
                pr_number: pr_handle.number(),
                repository_path: pr_handle.repository_path().full_name(),
                attempts: ctx.config.merge.attempt_retries + 1,
            })
        }
    }
}

#[async_trait]
impl ProcessPullRequestInterface for ProcessPullRequest {
    #[tracing::instrument(skip(self, ctx), fields(pr_handle = %pr_handle))]
    async fn run<'a>(
        &self,
        ctx: &CoreContext<'a>,
        pr_handle: &PullRequestHandle,
    ) -> Result<ProcessOutcome> {
        let probe: &dyn ProbePullRequestMergeabilityInterface = ctx.core_module.resolve_ref();
        let upstream_pr = probe
            .run(ctx, pr_handle, ctx.config.merge.probe_retries)
            .await?;

        let plan = if upstream_pr.state != GhPullRequestState::Open
            || upstream_pr.merged == Some(true)
        {
            Eligibility::Skip(SkipReason::NotOpen)
        } else {
            EligibilityClassifier::new(&ctx.config.merge).classify(&upstream_pr)
        };

        let plan = match plan {
            Eligibility::Eligible(plan) => plan,
            Eligibility::Skip(reason) => {
                info!(
                    owner = %pr_handle.owner(),
                    name = %pr_handle.name(),
                    pr_number = pr_handle.number(),
                    reason = %reason,
                    message = "Skipping pull request"
                );
                return Ok(ProcessOutcome::Skip(reason));
            }
        };

        if plan.target == BranchKind::Main {
            return Self::merge(ctx, pr_handle, &upstream_pr, &plan).await;
        }

        let repository_path = pr_handle.repository_path();
        let elevate_credentials: &dyn ElevateCredentialsInterface = ctx.core_module.resolve_ref();
        elevate_credentials.run(ctx, repository_path).await?;

        let rolled = Self::roll_into_main(ctx, pr_handle, &upstream_pr).await;

        let drop_credentials: &dyn DropCredentialsInterface = ctx.core_module.resolve_ref();
        if let Err(e) = drop_credentials.run(ctx, repository_path).await {
            warn!(
                owner = %pr_handle.owner(),
                name = %pr_handle.name(),
                error = %e,
                message = "Could not restore the plain remote URL"
            );
        }

        if let Some(outcome) = rolled? {
            return Ok(outcome);
        }

        let outcome = Self::merge(ctx, pr_handle, &upstream_pr, &plan).await;
        if let Err(e) = &outcome {
            error!(
                owner = %pr_handle.owner(),
                name = %pr_handle.name(),
                pr_number = pr_handle.number(),
                main_branch = %ctx.config.merge.main_branch,
                error = %e,
                message = "Main branch was updated but the pull request could not be merged, manual recovery needed"
            );
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use mergebot_ghapi_interface::types::{GhBranch, GhMergeableState};
    use mergebot_models::MergeStrategy;
    use mockall::Sequence;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        context::tests::CoreContextTest,
        use_cases::pulls::{
            MockCheckRollupConflictInterface, MockDropCredentialsInterface,
            MockElevateCredentialsInterface, MockProbePullRequestMergeabilityInterface,
            MockRollReleaseIntoMainInterface, MockTryMergePullRequestInterface,
        },
        CoreModule,
    };

    fn upstream_pr(base: &str, labels: &[&str]) -> GhPullRequest {
        GhPullRequest {
            number: 1,
            title: "Test".into(),
            labels: labels.iter().map(|&l| l.into()).collect(),
            head: GhBranch {
                reference: "feature".into(),
                sha: "abcdef".into(),
                ..Default::default()
            },
            base: GhBranch {
                reference: base.into(),
                ..Default::default()
            },
            mergeable: Some(true),
            mergeable_state: GhMergeableState::Clean,
            ..Default::default()
        }
    }

    fn probe_returning(pr: GhPullRequest) -> MockProbePullRequestMergeabilityInterface {
        let mut probe = MockProbePullRequestMergeabilityInterface::new();
        probe
            .expect_run()
            .once()
            .withf(|_, handle, retries| handle.number() == 1 && retries == &3)
            .return_once(move |_, _, _| Ok(pr));
        probe
    }

    fn try_merge_returning(result: bool) -> MockTryMergePullRequestInterface {
        let mut try_merge = MockTryMergePullRequestInterface::new();
        try_merge
            .expect_run()
            .once()
            .withf(|_, _, sha, strategy, _| sha == "abcdef" && *strategy == MergeStrategy::Merge)
            .return_const(result);
        try_merge
    }

    #[tokio::test]
    async fn skip_without_label() {
        let mut ctx = CoreContextTest::new();
        let mut try_merge = MockTryMergePullRequestInterface::new();
        try_merge.expect_run().never();

        ctx.core_module = CoreModule::builder()
            .with_component_override::<dyn ProbePullRequestMergeabilityInterface>(Box::new(
                probe_returning(upstream_pr("master", &[])),
            ))
            .with_component_override::<dyn TryMergePullRequestInterface>(Box::new(try_merge))
            .build();

        assert_eq!(
            ProcessPullRequest
                .run(&ctx.as_context(), &("me", "test", 1).into())
                .await
                .unwrap(),
            ProcessOutcome::Skip(SkipReason::MissingAutomergeLabel)
        );
    }

    #[tokio::test]
    async fn skip_closed_pull_request() {
        let mut ctx = CoreContextTest::new();
        let mut pr = upstream_pr("master", &["Automerge"]);
        pr.state = GhPullRequestState::Closed;

        ctx.core_module = CoreModule::builder()
            .with_component_override::<dyn ProbePullRequestMergeabilityInterface>(Box::new(
                probe_returning(pr),
            ))
            .build();

        assert_eq!(
            ProcessPullRequest
                .run(&ctx.as_context(), &("me", "test", 1).into())
                .await
                .unwrap(),
            ProcessOutcome::Skip(SkipReason::NotOpen)
        );
    }

    #[tokio::test]
    async fn main_branch_is_merged_directly() {
        let mut ctx = CoreContextTest::new();
        let mut try_merge = MockTryMergePullRequestInterface::new();
        try_merge
            .expect_run()
            .once()
            .withf(|_, _, sha, strategy, title| {
                sha == "abcdef" && *strategy == MergeStrategy::Squash && title == "Test (#1)"
            })
            .return_const(true);
        let mut elevate = MockElevateCredentialsInterface::new();
        elevate.expect_run().never();

        ctx.core_module = CoreModule::builder()
            .with_component_override::<dyn ProbePullRequestMergeabilityInterface>(Box::new(
                probe_returning(upstream_pr("master", &["Automerge"])),
            ))
            .with_component_override::<dyn TryMergePullRequestInterface>(Box::new(try_merge))
            .with_component_override::<dyn ElevateCredentialsInterface>(Box::new(elevate))
            .build();

        assert_eq!(
            ProcessPullRequest
                .run(&ctx.as_context(), &("me", "test", 1).into())
                .await
                .unwrap(),
            ProcessOutcome::Merged
        );
    }

    #[tokio::test]
    async fn release_branch_rolls_into_main_before_merge() {
        let mut ctx = CoreContextTest::new();
        let mut seq = Sequence::new();

        let mut elevate = MockElevateCredentialsInterface::new();
        elevate
            .expect_run()
            .once()
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        let mut check_rollup = MockCheckRollupConflictInterface::new();
        check_rollup
            .expect_run()
            .once()
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(RollupCheck::NoConflict));
        let mut roll = MockRollReleaseIntoMainInterface::new();
        roll.expect_run()
            .once()
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));
        let mut drop = MockDropCredentialsInterface::new();
        drop.expect_run()
            .once()
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        let mut try_merge = MockTryMergePullRequestInterface::new();
        try_merge
            .expect_run()
            .once()
            .in_sequence(&mut seq)
            .withf(|_, _, sha, strategy, title| {
                sha == "abcdef" && *strategy == MergeStrategy::Merge && title.is_empty()
            })
            .return_const(true);

        ctx.core_module = CoreModule::builder()
            .with_component_override::<dyn ProbePullRequestMergeabilityInterface>(Box::new(
                probe_returning(upstream_pr("releases/2024-01", &["Automerge"])),
            ))
            .with_component_override::<dyn ElevateCredentialsInterface>(Box::new(elevate))
            .with_component_override::<dyn CheckRollupConflictInterface>(Box::new(check_rollup))
            .with_component_override::<dyn RollReleaseIntoMainInterface>(Box::new(roll))
            .with_component_override::<dyn DropCredentialsInterface>(Box::new(drop))
            .with_component_override::<dyn TryMergePullRequestInterface>(Box::new(try_merge))
            .build();

        assert_eq!(
            ProcessPullRequest
                .run(&ctx.as_context(), &("me", "test", 1).into())
                .await
                .unwrap(),
            ProcessOutcome::Merged
        );
    }

    #[tokio::test]
    async fn rollup_conflict_blocks_merge() {
        let mut ctx = CoreContextTest::new();

        let mut elevate = MockElevateCredentialsInterface::new();
        elevate.expect_run().once().returning(|_, _| Ok(()));
        let mut check_rollup = MockCheckRollupConflictInterface::new();
        check_rollup
            .expect_run()
            .once()
            .returning(|_, _, _| Ok(RollupCheck::Conflict("CONFLICT".into())));
        let mut roll = MockRollReleaseIntoMainInterface::new();
        roll.expect_run().never();
        let mut drop = MockDropCredentialsInterface::new();
        drop.expect_run().once().returning(|_, _| Ok(()));
        let mut try_merge = MockTryMergePullRequestInterface::new();
        try_merge.expect_run().never();

        ctx.core_module = CoreModule::builder()
            .with_component_override::<dyn ProbePullRequestMergeabilityInterface>(Box::new(
                probe_returning(upstream_pr("release", &["Automerge"])),
            ))
            .with_component_override::<dyn ElevateCredentialsInterface>(Box::new(elevate))
            .with_component_override::<dyn CheckRollupConflictInterface>(Box::new(check_rollup))
            .with_component_override::<dyn RollReleaseIntoMainInterface>(Box::new(roll))
            .with_component_override::<dyn DropCredentialsInterface>(Box::new(drop))
            .with_component_override::<dyn TryMergePullRequestInterface>(Box::new(try_merge))
            .build();

        assert_eq!(
            ProcessPullRequest
                .run(&ctx.as_context(), &("me", "test", 1).into())
                .await
                .unwrap(),
            ProcessOutcome::RollupBlocked
        );
    }

    #[tokio::test]
    async fn already_reported_rollup_conflict_is_skipped() {
        let mut ctx = CoreContextTest::new();

        let mut elevate = MockElevateCredentialsInterface::new();
        elevate.expect_run().once().returning(|_, _| Ok(()));
        let mut check_rollup = MockCheckRollupConflictInterface::new();
        check_rollup
            .expect_run()
            .once()
            .returning(|_, _, _| Ok(RollupCheck::AlreadyReported("CONFLICT".into())));
        let mut roll = MockRollReleaseIntoMainInterface::new();
        roll.expect_run().never();
        let mut drop = MockDropCredentialsInterface::new();
        drop.expect_run().once().returning(|_, _| Ok(()));
        let mut try_merge = MockTryMergePullRequestInterface::new();
        try_merge.expect_run().never();

        ctx.core_module = CoreModule::builder()
            .with_component_override::<dyn ProbePullRequestMergeabilityInterface>(Box::new(
                probe_returning(upstream_pr("release", &["Automerge"])),
            ))
            .with_component_override::<dyn ElevateCredentialsInterface>(Box::new(elevate))
            .with_component_override::<dyn CheckRollupConflictInterface>(Box::new(check_rollup))
            .with_component_override::<dyn RollReleaseIntoMainInterface>(Box::new(roll))
            .with_component_override::<dyn DropCredentialsInterface>(Box::new(drop))
            .with_component_override::<dyn TryMergePullRequestInterface>(Box::new(try_merge))
            .build();

        assert_eq!(
            ProcessPullRequest
                .run(&ctx.as_context(), &("me", "test", 1).into())
                .await
                .unwrap(),
            ProcessOutcome::Skip(SkipReason::RollupConflictAlreadyReported)
        );
    }

    #[tokio::test]
    async fn exhausted_merge_attempts_fail() {
        let mut ctx = CoreContextTest::new();

        let mut elevate = MockElevateCredentialsInterface::new();
        elevate.expect_run().once().returning(|_, _| Ok(()));
        let mut check_rollup = MockCheckRollupConflictInterface::new();
        check_rollup
            .expect_run()
            .once()
            .returning(|_, _, _| Ok(RollupCheck::NoConflict));
        let mut roll = MockRollReleaseIntoMainInterface::new();
        roll.expect_run().once().returning(|_, _, _| Ok(()));
        let mut drop = MockDropCredentialsInterface::new();
        drop.expect_run().once().returning(|_, _| Ok(()));

        ctx.core_module = CoreModule::builder()
            .with_component_override::<dyn ProbePullRequestMergeabilityInterface>(Box::new(
                probe_returning(upstream_pr("release", &["Automerge"])),
            ))
            .with_component_override::<dyn ElevateCredentialsInterface>(Box::new(elevate))
            .with_component_override::<dyn CheckRollupConflictInterface>(Box::new(check_rollup))
            .with_component_override::<dyn RollReleaseIntoMainInterface>(Box::new(roll))
            .with_component_override::<dyn DropCredentialsInterface>(Box::new(drop))
            .with_component_override::<dyn TryMergePullRequestInterface>(Box::new(
                try_merge_returning(false),
            ))
            .build();

        let result = ProcessPullRequest
            .run(&ctx.as_context(), &("me", "test", 1).into())
            .await;

        match result {
            Err(DomainError::MergeFailed {
                pr_number,
                repository_path,
                attempts,
            }) => {
                assert_eq!(pr_number, 1);
                assert_eq!(repository_path, "me/test");
                assert_eq!(attempts, 4);
            }
            _ => panic!("Should error"),
        }
    }
}
