use std::str::FromStr;

use async_trait::async_trait;
use mergebot_ghapi_interface::types::{
    GhPullRequestAction, GhPullRequestEvent, GhPullRequestFilter, GhPushEvent, GhRepository,
    GhReviewEvent, GhStatusEvent,
};
use mergebot_models::{PullRequestHandle, RepositoryPath};
use shaku::{Component, HasComponent, Interface};
use tracing::{error, info};

use crate::{
    use_cases::pulls::{EligibilityClassifier, ProcessOutcome, ProcessPullRequestInterface},
    CoreContext, DomainError, Result,
};

const APPROVED_REVIEW_STATE: &str = "approved";

/// Handled webhook events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Push,
    Status,
    PullRequest,
    PullRequestReview,
}

impl EventType {
    pub fn to_str(self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Status => "status",
            Self::PullRequest => "pull_request",
            Self::PullRequestReview => "pull_request_review",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}

impl FromStr for EventType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "push" => Ok(Self::Push),
            "status" => Ok(Self::Status),
            "pull_request" => Ok(Self::PullRequest),
            "pull_request_review" => Ok(Self::PullRequestReview),
            other => Err(DomainError::ConfigurationError {
                message: format!("unsupported event '{other}'"),
            }),
        }
    }
}

/// Pull request numbers, by terminal state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub merged: Vec<u64>,
    pub skipped: Vec<u64>,
    pub blocked: Vec<u64>,
    pub failed: Vec<u64>,
}

impl DispatchReport {
    fn record(&mut self, pr_number: u64, outcome: &ProcessOutcome) {
        match outcome {
            ProcessOutcome::Merged => self.merged.push(pr_number),
            ProcessOutcome::Skip(_) => self.skipped.push(pr_number),
            ProcessOutcome::RollupBlocked => self.blocked.push(pr_number),
        }
    }

    /// Number of merged pull requests.
    pub fn updated(&self) -> usize {
        self.merged.len()
    }

    /// No pull request failed or got blocked.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.blocked.is_empty()
    }
}

#[cfg_attr(any(test, feature = "testkit"), mockall::automock)]
#[async_trait]
pub trait DispatchEventInterface: Interface {
    async fn run<'a>(
        &self,
        ctx: &CoreContext<'a>,
        event_type: EventType,
        payload: &str,
    ) -> Result<DispatchReport>;
}

#[derive(Component)]
#[shaku(interface = DispatchEventInterface)]
pub(crate) struct DispatchEvent;

fn repository_path(repository: &GhRepository) -> RepositoryPath {
    RepositoryPath::new(&repository.owner.login, &repository.name)
}

impl DispatchEvent {
    /// Process one pull request, failures are fatal.
    async fn process_single<'a>(
        ctx: &CoreContext<'a>,
        pr_handle: PullRequestHandle,
    ) -> Result<DispatchReport> {
        let process_pull_request: &dyn ProcessPullRequestInterface = ctx.core_module.resolve_ref();
        let outcome = process_pull_request.run(ctx, &pr_handle).await?;

        let mut report = DispatchReport::default();
        report.record(pr_handle.number(), &outcome);
        Ok(report)
    }

    /// Process pull requests one after the other, a failure does not stop the batch.
    async fn process_batch<'a>(
        ctx: &CoreContext<'a>,
        repository_path: &RepositoryPath,
        pr_numbers: Vec<u64>,
    ) -> DispatchReport {
        let process_pull_request: &dyn ProcessPullRequestInterface = ctx.core_module.resolve_ref();
        let mut report = DispatchReport::default();

        for pr_number in pr_numbers {
            let pr_handle = PullRequestHandle::new(repository_path.clone(), pr_number);
            match process_pull_request.run(ctx, &pr_handle).await {
                Ok(outcome) => report.record(pr_number, &outcome),
                Err(e) => {
                    error!(
                        owner = %pr_handle.owner(),
                        name = %pr_handle.name(),
                        pr_number = pr_number,
                        error = %e,
                        message = "Error while processing pull request"
                    );
                    report.failed.push(pr_number);
                }
            }
        }

        report
    }

    async fn handle_push<'a>(ctx: &CoreContext<'a>, event: GhPushEvent) -> Result<DispatchReport> {
        let branch = match event.branch_name() {
            Some(branch) => branch,
            None => return Ok(DispatchReport::default()),
        };

        if EligibilityClassifier::new(&ctx.config.merge)
            .branch_kind(branch)
            .is_none()
        {
            info!(branch = %branch, message = "Push on an unhandled branch, ignoring");
            return Ok(DispatchReport::default());
        }

        let repository_path = repository_path(&event.repository);
        let pr_numbers: Vec<u64> = ctx
            .api_service
            .pulls_list(
                repository_path.owner(),
                repository_path.name(),
                &GhPullRequestFilter::with_base(branch),
                ctx.config.merge.max_pull_requests,
            )
            .await?
            .into_iter()
            .map(|pr| pr.number)
            .take(ctx.config.merge.max_pull_requests as usize)
            .collect();

        Ok(Self::process_batch(ctx, &repository_path, pr_numbers).await)
    }

    async fn handle_status<'a>(
        ctx: &CoreContext<'a>,
        event: GhStatusEvent,
    ) -> Result<DispatchReport> {
        // Statuses posted by the rollup check must not trigger it again.
        if event.context == ctx.config.merge.status_context {
            return Ok(DispatchReport::default());
        }

        let repository_path = repository_path(&event.repository);
        let mut pr_numbers = vec![];
        for branch in event.head_branches() {
            let pulls = ctx
                .api_service
                .pulls_list(
                    repository_path.owner(),
                    repository_path.name(),
                    &GhPullRequestFilter::with_head(repository_path.owner(), branch),
                    ctx.config.merge.max_pull_requests,
                )
                .await?;

            for pr in pulls {
                if pr.head.sha == event.sha && !pr_numbers.contains(&pr.number) {
                    pr_numbers.push(pr.number);
                }
            }
        }
        pr_numbers.truncate(ctx.config.merge.max_pull_requests as usize);

        Ok(Self::process_batch(ctx, &repository_path, pr_numbers).await)
    }

    async fn handle_pull_request<'a>(
        ctx: &CoreContext<'a>,
        event: GhPullRequestEvent,
    ) -> Result<DispatchReport> {
        match event.action {
            GhPullRequestAction::Opened
            | GhPullRequestAction::Reopened
            | GhPullRequestAction::Synchronize
            | GhPullRequestAction::Labeled
            | GhPullRequestAction::Edited
            | GhPullRequestAction::ReadyForReview => {
                let pr_handle =
                    PullRequestHandle::new(repository_path(&event.repository), event.number);
                Self::process_single(ctx, pr_handle).await
            }
            action => {
                info!(action = ?action, message = "Pull request action ignored");
                Ok(DispatchReport::default())
            }
        }
    }

    async fn handle_review<'a>(
        ctx: &CoreContext<'a>,
        event: GhReviewEvent,
    ) -> Result<DispatchReport> {
        if !event.review.state.eq_ignore_ascii_case(APPROVED_REVIEW_STATE) {
            info!(state = %event.review.state, message = "Review ignored");
            return Ok(DispatchReport::default());
        }

        let pr_handle = PullRequestHandle::new(
            repository_path(&event.repository),
            event.pull_request.number,
        );
        Self::process_single(ctx, pr_handle).await
    }
}

#[async_trait]
impl DispatchEventInterface for DispatchEvent {
    #[tracing::instrument(skip(self, ctx, payload), fields(event_type = %event_type))]
    async fn run<'a>(
        &self,
        ctx: &CoreContext<'a>,
        event_type: EventType,
        payload: &str,
    ) -> Result<DispatchReport> {
        let report = match event_type {
            EventType::Push => Self::handle_push(ctx, serde_json::from_str(payload)?).await?,
            EventType::Status => Self::handle_status(ctx, serde_json::from_str(payload)?).await?,
            EventType::PullRequest => {
                Self::handle_pull_request(ctx, serde_json::from_str(payload)?).await?
            }
            EventType::PullRequestReview => {
                Self::handle_review(ctx, serde_json::from_str(payload)?).await?
            }
        };

        info!(
            merged = ?report.merged,
            skipped = ?report.skipped,
            blocked = ?report.blocked,
            failed = ?report.failed,
            message = "Event dispatched"
        );

        Ok(report)
    }
}
