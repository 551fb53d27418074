use async_trait::async_trait;

use crate::{
    types::{
        GhCommitStatusItem, GhCommitStatusState, GhMergeStrategy, GhPullRequest,
        GhPullRequestFilter, GhPullRequestShort,
    },
    Result,
};

/// Hosting platform API interface.
#[cfg_attr(any(test, feature = "testkit"), mockall::automock)]
#[async_trait]
pub trait ApiService: Send + Sync {
    /// Get a pull request from its number.
    async fn pulls_get(&self, owner: &str, name: &str, number: u64) -> Result<GhPullRequest>;
    /// List open pull requests matching a filter, up to `per_page` items.
    async fn pulls_list(
        &self,
        owner: &str,
        name: &str,
        filter: &GhPullRequestFilter,
        per_page: u64,
    ) -> Result<Vec<GhPullRequestShort>>;
    /// Merge a pull request, only if its head still points to `sha`.
    #[allow(clippy::too_many_arguments)]
    async fn pulls_merge(
        &self,
        owner: &str,
        name: &str,
        number: u64,
        commit_title: &str,
        commit_message: &str,
        merge_strategy: GhMergeStrategy,
        sha: &str,
    ) -> Result<()>;
    /// List commit statuses for a reference, most recent first.
    async fn commit_statuses_list(
        &self,
        owner: &str,
        name: &str,
        git_ref: &str,
    ) -> Result<Vec<GhCommitStatusItem>>;
    /// Create a commit status.
    async fn commit_statuses_update(
        &self,
        owner: &str,
        name: &str,
        git_ref: &str,
        status: GhCommitStatusState,
        context: &str,
        description: &str,
    ) -> Result<()>;
    /// Post a comment on a pull request.
    async fn comments_post(
        &self,
        owner: &str,
        name: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<u64>;
    /// Get the app installation identifier of a repository.
    async fn repository_installation_get(
        &self,
        auth_token: &str,
        owner: &str,
        name: &str,
    ) -> Result<u64>;
    /// Create installation token.
    async fn installations_create_token(
        &self,
        auth_token: &str,
        installation_id: u64,
    ) -> Result<String>;
    /// Create an installation token scoped to a repository, using the app credentials.
    async fn installation_token_for_repository(&self, owner: &str, name: &str) -> Result<String>;
    /// Use a token for subsequent calls.
    fn use_access_token(&self, token: &str);
}
