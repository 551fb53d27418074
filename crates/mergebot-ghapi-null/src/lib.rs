//! Null driver for GH API.

#![warn(missing_docs)]
#![warn(clippy::all)]

use async_trait::async_trait;
use mergebot_ghapi_interface::{
    types::{
        GhCommitStatusItem, GhCommitStatusState, GhMergeStrategy, GhPullRequest,
        GhPullRequestFilter, GhPullRequestShort,
    },
    ApiService, Result,
};

/// Null API service.
///
/// Reads return empty values and writes are only traced, which makes it
/// usable for dry runs against a local clone.
#[derive(Clone, Default)]
pub struct NullApiService {
    _private: (),
}

impl NullApiService {
    /// Build a null API service.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

#[async_trait]
impl ApiService for NullApiService {
    #[tracing::instrument(skip(self), ret)]
    async fn pulls_get(&self, owner: &str, name: &str, number: u64) -> Result<GhPullRequest> {
        Ok(GhPullRequest {
            number,
            ..Default::default()
        })
    }

    #[tracing::instrument(skip(self), ret)]
    async fn pulls_list(
        &self,
        owner: &str,
        name: &str,
        filter: &GhPullRequestFilter,
        per_page: u64,
    ) -> Result<Vec<GhPullRequestShort>> {
        Ok(vec![])
    }

    #[tracing::instrument(skip(self))]
    async fn pulls_merge(
        &self,
        owner: &str,
        name: &str,
        number: u64,
        commit_title: &str,
        commit_message: &str,
        merge_strategy: GhMergeStrategy,
        sha: &str,
    ) -> Result<()> {
        Ok(())
    }

    #[tracing::instrument(skip(self), ret)]
    async fn commit_statuses_list(
        &self,
        owner: &str,
        name: &str,
        git_ref: &str,
    ) -> Result<Vec<GhCommitStatusItem>> {
        Ok(vec![])
    }

    #[tracing::instrument(skip(self))]
    async fn commit_statuses_update(
        &self,
        owner: &str,
        name: &str,
        git_ref: &str,
        status: GhCommitStatusState,
        context: &str,
        description: &str,
    ) -> Result<()> {
        Ok(())
    }

    #[tracing::instrument(skip(self), ret)]
    async fn comments_post(
        &self,
        owner: &str,
        name: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<u64> {
        Ok(0)
    }

    #[tracing::instrument(skip(self, auth_token), ret)]
    async fn repository_installation_get(
        &self,
        auth_token: &str,
        owner: &str,
        name: &str,
    ) -> Result<u64> {
        Ok(0)
    }

    #[tracing::instrument(skip(self, auth_token), ret)]
    async fn installations_create_token(
        &self,
        auth_token: &str,
        installation_id: u64,
    ) -> Result<String> {
        Ok(String::new())
    }

    #[tracing::instrument(skip(self), ret)]
    async fn installation_token_for_repository(&self, owner: &str, name: &str) -> Result<String> {
        Ok(String::new())
    }

    fn use_access_token(&self, _token: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_are_empty() {
        let service = NullApiService::new();

        assert_eq!(service.pulls_get("me", "repo", 4).await.unwrap().number, 4);
        assert!(service
            .pulls_list("me", "repo", &GhPullRequestFilter::with_base("master"), 20)
            .await
            .unwrap()
            .is_empty());
        assert!(service
            .commit_statuses_list("me", "repo", "abcd")
            .await
            .unwrap()
            .is_empty());
    }
}
