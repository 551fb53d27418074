//! Version-control primitives.
//!
//! Git commands are run as child processes against a single working
//! directory, one at a time, and their exit codes are interpreted into
//! typed results.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod errors;
mod git;
mod runner;

pub use errors::{GitError, ProcessError, Result};
#[cfg(any(test, feature = "testkit"))]
pub use git::MockGitService;
pub use git::{GitService, MergeOutcome, ProcessGitService};
#[cfg(any(test, feature = "testkit"))]
pub use runner::MockProcessRunner;
pub use runner::{ProcessRunner, TokioProcessRunner};
