use async_trait::async_trait;
use mergebot_config::Config;
use mergebot_models::RepositoryPath;
use shaku::{Component, Interface};
use tracing::info;

use crate::{CoreContext, Result};

/// Plain HTTPS remote URL of a repository.
pub(crate) fn remote_url(config: &Config, repository_path: &RepositoryPath) -> String {
    format!(
        "{}/{}/{}.git",
        config.api.github.server_url.trim_end_matches('/'),
        repository_path.owner(),
        repository_path.name()
    )
}

/// Remote URL embedding an access token.
pub(crate) fn authenticated_remote_url(
    config: &Config,
    repository_path: &RepositoryPath,
    token: &str,
) -> String {
    let server_url = config.api.github.server_url.trim_end_matches('/');
    let (scheme, host) = server_url.split_once("://").unwrap_or(("https", server_url));

    format!(
        "{scheme}://x-access-token:{token}@{host}/{}/{}.git",
        repository_path.owner(),
        repository_path.name()
    )
}

/// Config key holding the credentials persisted by the checkout step.
pub(crate) fn extra_header_key(config: &Config) -> String {
    format!(
        "http.{}/.extraheader",
        config.api.github.server_url.trim_end_matches('/')
    )
}

#[cfg_attr(any(test, feature = "testkit"), mockall::automock)]
#[async_trait]
pub trait ElevateCredentialsInterface: Interface {
    /// Switch the API and git remote to an installation token allowed to
    /// push and merge.
    async fn run<'a>(&self, ctx: &CoreContext<'a>, repository_path: &RepositoryPath)
        -> Result<()>;
}

#[derive(Component)]
#[shaku(interface = ElevateCredentialsInterface)]
pub(crate) struct ElevateCredentials;

#[async_trait]
impl ElevateCredentialsInterface for ElevateCredentials {
    #[tracing::instrument(skip(self, ctx), fields(repository_path = %repository_path))]
    async fn run<'a>(
        &self,
        ctx: &CoreContext<'a>,
        repository_path: &RepositoryPath,
    ) -> Result<()> {
        let token = if ctx.config.api.github.app_id == 0 {
            ctx.config.api.github.token.clone()
        } else {
            let token = ctx
                .api_service
                .installation_token_for_repository(repository_path.owner(), repository_path.name())
                .await?;
            ctx.api_service.use_access_token(&token);
            token
        };

        ctx.git_service
            .config_unset(&extra_header_key(ctx.config))
            .await?;
        ctx.git_service
            .remote_set_url(
                &ctx.config.git.remote,
                &authenticated_remote_url(ctx.config, repository_path, &token),
            )
            .await?;

        info!(
            owner = %repository_path.owner(),
            name = %repository_path.name(),
            message = "Credentials elevated"
        );

        Ok(())
    }
}
