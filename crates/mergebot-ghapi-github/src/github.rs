//! GitHub adapter

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use mergebot_config::Config;
use mergebot_ghapi_interface::{
    types::{
        GhCommitStatusItem, GhCommitStatusState, GhMergeStrategy, GhPullRequest,
        GhPullRequestFilter, GhPullRequestShort,
    },
    ApiService, Result,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    auth::{
        build_github_url, create_installation_access_token, get_anonymous_client_builder,
        get_authenticated_client_builder,
    },
    errors::GitHubError,
};

const MAX_STATUS_DESCRIPTION_LEN: usize = 139;

/// GitHub API adapter implementation.
pub struct GithubApiService {
    config: Config,
    access_token: RwLock<Option<String>>,
}

impl GithubApiService {
    /// Creates new GitHub API adapter.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            access_token: RwLock::new(None),
        }
    }

    fn access_token(&self) -> Option<String> {
        self.access_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn authentication_token(&self, owner: &str, name: &str) -> Result<String, GitHubError> {
        if let Some(token) = self.access_token() {
            Ok(token)
        } else if !self.config.api.github.token.is_empty() {
            Ok(self.config.api.github.token.clone())
        } else {
            create_installation_access_token(&self.config, self, owner, name).await
        }
    }

    async fn get_client(&self, owner: &str, name: &str) -> Result<Client, GitHubError> {
        let token = self.authentication_token(owner, name).await?;
        Ok(get_authenticated_client_builder(&self.config, &token)?.build()?)
    }

    fn build_url(&self, path: String) -> String {
        build_github_url(&self.config, path)
    }

    async fn get_pull_request(
        &self,
        owner: &str,
        name: &str,
        number: u64,
    ) -> Result<GhPullRequest, GitHubError> {
        Ok(self
            .get_client(owner, name)
            .await?
            .get(&self.build_url(format!("/repos/{owner}/{name}/pulls/{number}")))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }

    async fn list_pull_requests(
        &self,
        owner: &str,
        name: &str,
        filter: &GhPullRequestFilter,
        per_page: u64,
    ) -> Result<Vec<GhPullRequestShort>, GitHubError> {
        let mut query = vec![
            ("state", "open".to_string()),
            ("per_page", per_page.to_string()),
        ];
        if let Some(base) = &filter.base {
            query.push(("base", base.clone()));
        }
        if let Some(head) = &filter.head {
            query.push(("head", head.clone()));
        }

        Ok(self
            .get_client(owner, name)
            .await?
            .get(&self.build_url(format!("/repos/{owner}/{name}/pulls")))
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }

    #[allow(clippy::too_many_arguments)]
    async fn merge_pull_request(
        &self,
        owner: &str,
        name: &str,
        number: u64,
        commit_title: &str,
        commit_message: &str,
        merge_strategy: GhMergeStrategy,
        sha: &str,
    ) -> Result<(), GitHubError> {
        #[derive(Serialize)]
        struct Request<'a> {
            #[serde(skip_serializing_if = "str::is_empty")]
            commit_title: &'a str,
            commit_message: &'a str,
            merge_method: String,
            sha: &'a str,
        }

        let response = self
            .get_client(owner, name)
            .await?
            .put(&self.build_url(format!("/repos/{owner}/{name}/pulls/{number}/merge")))
            .json(&Request {
                commit_title,
                commit_message,
                merge_method: merge_strategy.to_string(),
                sha,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(GitHubError::MergeError {
                pr_number: number,
                repository_path: format!("{owner}/{name}"),
                reason: format!("{status}: {body}"),
            })
        }
    }

    async fn list_commit_statuses(
        &self,
        owner: &str,
        name: &str,
        git_ref: &str,
    ) -> Result<Vec<GhCommitStatusItem>, GitHubError> {
        Ok(self
            .get_client(owner, name)
            .await?
            .get(&self.build_url(format!(
                "/repos/{owner}/{name}/commits/{git_ref}/statuses"
            )))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }

    async fn update_commit_status(
        &self,
        owner: &str,
        name: &str,
        git_ref: &str,
        status: GhCommitStatusState,
        context: &str,
        description: &str,
    ) -> Result<(), GitHubError> {
        #[derive(Serialize)]
        struct Request<'a> {
            state: &'a str,
            description: String,
            context: &'a str,
        }

        self.get_client(owner, name)
            .await?
            .post(&self.build_url(format!("/repos/{owner}/{name}/statuses/{git_ref}")))
            .json(&Request {
                state: status.to_str(),
                context,
                description: truncate_status_description(description),
            })
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    async fn post_comment(
        &self,
        owner: &str,
        name: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<u64, GitHubError> {
        #[derive(Serialize)]
        struct Request<'a> {
            body: &'a str,
        }

        #[derive(Deserialize)]
        struct Response {
            id: u64,
        }

        Ok(self
            .get_client(owner, name)
            .await?
            .post(&self.build_url(format!(
                "/repos/{owner}/{name}/issues/{issue_number}/comments"
            )))
            .json(&Request { body })
            .send()
            .await?
            .error_for_status()?
            .json::<Response>()
            .await?
            .id)
    }

    async fn get_repository_installation(
        &self,
        auth_token: &str,
        owner: &str,
        name: &str,
    ) -> Result<u64, GitHubError> {
        #[derive(Deserialize)]
        struct Response {
            id: u64,
        }

        Ok(get_anonymous_client_builder(&self.config)
            .build()?
            .get(&self.build_url(format!("/repos/{owner}/{name}/installation")))
            .bearer_auth(auth_token)
            .send()
            .await?
            .error_for_status()?
            .json::<Response>()
            .await?
            .id)
    }

    async fn create_installation_token(
        &self,
        auth_token: &str,
        installation_id: u64,
    ) -> Result<String, GitHubError> {
        #[derive(Deserialize)]
        struct Response {
            token: String,
        }

        Ok(get_anonymous_client_builder(&self.config)
            .build()?
            .post(&self.build_url(format!(
                "/app/installations/{installation_id}/access_tokens"
            )))
            .bearer_auth(auth_token)
            .send()
            .await?
            .error_for_status()?
            .json::<Response>()
            .await?
            .token)
    }
}

fn truncate_status_description(description: &str) -> String {
    description
        .chars()
        .take(MAX_STATUS_DESCRIPTION_LEN)
        .collect()
}

#[async_trait]
impl ApiService for GithubApiService {
    #[tracing::instrument(skip(self))]
    async fn pulls_get(&self, owner: &str, name: &str, number: u64) -> Result<GhPullRequest> {
        Ok(self.get_pull_request(owner, name, number).await?)
    }

    #[tracing::instrument(skip(self), ret)]
    async fn pulls_list(
        &self,
        owner: &str,
        name: &str,
        filter: &GhPullRequestFilter,
        per_page: u64,
    ) -> Result<Vec<GhPullRequestShort>> {
        Ok(self
            .list_pull_requests(owner, name, filter, per_page)
            .await?)
    }

    #[tracing::instrument(skip(self, commit_message))]
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
        Ok(self
            .merge_pull_request(
                owner,
                name,
                number,
                commit_title,
                commit_message,
                merge_strategy,
                sha,
            )
            .await?)
    }

    #[tracing::instrument(skip(self))]
    async fn commit_statuses_list(
        &self,
        owner: &str,
        name: &str,
        git_ref: &str,
    ) -> Result<Vec<GhCommitStatusItem>> {
        Ok(self.list_commit_statuses(owner, name, git_ref).await?)
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
        Ok(self
            .update_commit_status(owner, name, git_ref, status, context, description)
            .await?)
    }

    #[tracing::instrument(skip(self, body), ret)]
    async fn comments_post(
        &self,
        owner: &str,
        name: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<u64> {
        Ok(self.post_comment(owner, name, issue_number, body).await?)
    }

    #[tracing::instrument(skip(self, auth_token), ret)]
    async fn repository_installation_get(
        &self,
        auth_token: &str,
        owner: &str,
        name: &str,
    ) -> Result<u64> {
        Ok(self
            .get_repository_installation(auth_token, owner, name)
            .await?)
    }

    #[tracing::instrument(skip(self, auth_token))]
    async fn installations_create_token(
        &self,
        auth_token: &str,
        installation_id: u64,
    ) -> Result<String> {
        Ok(self
            .create_installation_token(auth_token, installation_id)
            .await?)
    }

    #[tracing::instrument(skip(self))]
    async fn installation_token_for_repository(&self, owner: &str, name: &str) -> Result<String> {
        Ok(create_installation_access_token(&self.config, self, owner, name).await?)
    }

    fn use_access_token(&self, token: &str) {
        let mut access_token = self
            .access_token
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *access_token = Some(token.to_string());
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn status_description_is_truncated() {
        let description = "a".repeat(200);
        assert_eq!(
            truncate_status_description(&description).len(),
            MAX_STATUS_DESCRIPTION_LEN
        );
        assert_eq!(truncate_status_description("short"), "short");
    }

    #[tokio::test]
    async fn access_token_takes_precedence() {
        let mut config = Config::from_env_no_version();
        config.api.github.token = "configured".into();

        let service = GithubApiService::new(config);
        assert_eq!(
            service.authentication_token("me", "repo").await.unwrap(),
            "configured"
        );

        service.use_access_token("elevated");
        assert_eq!(
            service.authentication_token("me", "repo").await.unwrap(),
            "elevated"
        );
    }

    #[test]
    fn build_url() {
        let mut config = Config::from_env_no_version();
        config.api.github.root_url = "https://api.example.com".into();

        let service = GithubApiService::new(config);
        assert_eq!(
            service.build_url("/repos/me/repo".into()),
            "https://api.example.com/repos/me/repo"
        );
    }
}
