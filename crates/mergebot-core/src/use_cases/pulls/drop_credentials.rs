use async_trait::async_trait;
use mergebot_models::RepositoryPath;
use shaku::{Component, Interface};

use super::elevate_credentials::remote_url;
use crate::{CoreContext, Result};

#[cfg_attr(any(test, feature = "testkit"), mockall::automock)]
#[async_trait]
pub trait DropCredentialsInterface: Interface {
    /// Restore the plain remote URL.
    async fn run<'a>(&self, ctx: &CoreContext<'a>, repository_path: &RepositoryPath)
        -> Result<()>;
}

#[derive(Component)]
#[shaku(interface = DropCredentialsInterface)]
pub(crate) struct DropCredentials;

#[async_trait]
impl DropCredentialsInterface for DropCredentials {
    #[tracing::instrument(skip(self, ctx), fields(repository_path = %repository_path))]
    async fn run<'a>(
        &self,
        ctx: &CoreContext<'a>,
        repository_path: &RepositoryPath,
    ) -> Result<()> {
        ctx.git_service
            .remote_set_url(
                &ctx.config.git.remote,
                &remote_url(ctx.config, repository_path),
            )
            .await?;

        Ok(())
    }
}
