pub(crate) mod check_rollup_conflict;
pub(crate) mod classify_pull_request;
pub(crate) mod drop_credentials;
pub(crate) mod elevate_credentials;
pub(crate) mod locate_merge_base;
pub(crate) mod probe_pull_request_mergeability;
pub(crate) mod process_pull_request;
pub(crate) mod roll_release_into_main;
pub(crate) mod try_merge_pull_request;

pub use check_rollup_conflict::{CheckRollupConflictInterface, RollupCheck};
pub use classify_pull_request::{Eligibility, EligibilityClassifier, MergePlan, SkipReason};
pub use drop_credentials::DropCredentialsInterface;
pub use elevate_credentials::ElevateCredentialsInterface;
pub use locate_merge_base::{merge_base_of_all, LocateMergeBaseInterface};
pub use probe_pull_request_mergeability::ProbePullRequestMergeabilityInterface;
pub use process_pull_request::{ProcessOutcome, ProcessPullRequestInterface};
pub use roll_release_into_main::RollReleaseIntoMainInterface;
pub use try_merge_pull_request::TryMergePullRequestInterface;

#[cfg(any(test, feature = "testkit"))]
pub use self::{
    check_rollup_conflict::MockCheckRollupConflictInterface,
    drop_credentials::MockDropCredentialsInterface,
    elevate_credentials::MockElevateCredentialsInterface,
    locate_merge_base::MockLocateMergeBaseInterface,
    probe_pull_request_mergeability::MockProbePullRequestMergeabilityInterface,
    process_pull_request::MockProcessPullRequestInterface,
    roll_release_into_main::MockRollReleaseIntoMainInterface,
    try_merge_pull_request::MockTryMergePullRequestInterface,
};
