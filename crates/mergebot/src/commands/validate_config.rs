use async_trait::async_trait;
use clap::Parser;

use super::{Command, CommandContext};
use crate::Result;

/// Check the configuration, then exit
#[derive(Parser)]
pub(crate) struct ValidateConfigCommand;

#[async_trait]
impl Command for ValidateConfigCommand {
    async fn execute(self, ctx: CommandContext) -> Result<()> {
        writeln!(
            ctx.writer.write().await,
            "Configuration is valid (main branch: {}, release branches: [{}], releases prefix: {})",
            ctx.config.merge.main_branch,
            ctx.config.merge.release_branches.join(", "),
            ctx.config.merge.releases_prefix
        )?;

        Ok(())
    }
}
