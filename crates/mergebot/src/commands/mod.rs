//! Commands.

use std::{io::Write, sync::Arc};

use async_trait::async_trait;
use clap::Subcommand;
use mergebot_config::Config;
use mergebot_core::{CoreContext, CoreModule, SleepService};
use mergebot_ghapi_interface::ApiService;
use mergebot_git::GitService;
use tokio::sync::RwLock;

use self::{handle_event::HandleEventCommand, validate_config::ValidateConfigCommand};
use crate::Result;

mod handle_event;
mod validate_config;

pub(crate) struct CommandContext {
    pub config: Config,
    pub core_module: CoreModule,
    pub api_service: Box<dyn ApiService + Send + Sync>,
    pub git_service: Box<dyn GitService + Send + Sync>,
    pub sleep_service: Box<dyn SleepService + Send + Sync>,
    pub writer: Arc<RwLock<dyn Write + Send + Sync>>,
}

impl CommandContext {
    pub fn as_core_context(&self) -> CoreContext {
        CoreContext {
            config: &self.config,
            core_module: &self.core_module,
            api_service: self.api_service.as_ref(),
            git_service: self.git_service.as_ref(),
            sleep_service: self.sleep_service.as_ref(),
        }
    }
}

#[async_trait]
pub(crate) trait Command {
    async fn execute(self, ctx: CommandContext) -> Result<()>;
}

/// Command
#[derive(Subcommand)]
pub(crate) enum SubCommand {
    HandleEvent(HandleEventCommand),
    ValidateConfig(ValidateConfigCommand),
}

#[async_trait]
impl Command for SubCommand {
    async fn execute(self, ctx: CommandContext) -> Result<()> {
        match self {
            Self::HandleEvent(sub) => sub.execute(ctx).await,
            Self::ValidateConfig(sub) => sub.execute(ctx).await,
        }
    }
}
