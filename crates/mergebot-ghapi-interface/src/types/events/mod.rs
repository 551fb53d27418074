mod pull_request_event;
mod push_event;
mod review_event;
mod status_event;

pub use pull_request_event::{GhPullRequestAction, GhPullRequestEvent};
pub use push_event::GhPushEvent;
pub use review_event::{GhReview, GhReviewEvent};
pub use status_event::{GhStatusBranch, GhStatusCommit, GhStatusEvent};
