use std::str::FromStr;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use clap::Parser;
use mergebot_core::use_cases::events::{DispatchEventInterface, EventType};
use shaku::HasComponent;

use super::{Command, CommandContext};
use crate::Result;

/// Handle a webhook event, merging eligible pull requests
#[derive(Parser)]
pub(crate) struct HandleEventCommand;

#[async_trait]
impl Command for HandleEventCommand {
    async fn execute(self, ctx: CommandContext) -> Result<()> {
        let event_type = EventType::from_str(&ctx.config.event.name)?;
        let payload = tokio::fs::read_to_string(&ctx.config.event.path)
            .await
            .with_context(|| format!("Could not read event payload '{}'", ctx.config.event.path))?;

        let dispatch_event: &dyn DispatchEventInterface = ctx.core_module.resolve_ref();
        let report = dispatch_event
            .run(&ctx.as_core_context(), event_type, &payload)
            .await?;

        writeln!(
            ctx.writer.write().await,
            "{} pull request(s) updated",
            report.updated()
        )?;

        if report.is_success() {
            Ok(())
        } else {
            Err(anyhow!(
                "{} pull request(s) blocked by a rollup conflict, {} failed",
                report.blocked.len(),
                report.failed.len()
            ))
        }
    }
}
