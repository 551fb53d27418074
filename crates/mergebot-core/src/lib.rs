//! Logic module.

#![warn(clippy::all)]
#![allow(clippy::new_without_default)]

mod context;
pub mod errors;
mod sleep;
pub mod use_cases;

pub use context::CoreContext;
pub use errors::{DomainError, Result};
#[cfg(any(test, feature = "testkit"))]
pub use sleep::MockSleepService;
pub use sleep::{SleepService, TokioSleepService};
use shaku::module;
use use_cases::{
    events::dispatch_event::DispatchEvent,
    pulls::{
        check_rollup_conflict::CheckRollupConflict, drop_credentials::DropCredentials,
        elevate_credentials::ElevateCredentials, locate_merge_base::LocateMergeBase,
        probe_pull_request_mergeability::ProbePullRequestMergeability,
        process_pull_request::ProcessPullRequest, roll_release_into_main::RollReleaseIntoMain,
        try_merge_pull_request::TryMergePullRequest,
    },
};

module! {
    pub CoreModule {
        components = [
            ProbePullRequestMergeability, CheckRollupConflict, LocateMergeBase,
            TryMergePullRequest, ElevateCredentials, DropCredentials,
            RollReleaseIntoMain, ProcessPullRequest, DispatchEvent
        ],
        providers = []
    }
}
