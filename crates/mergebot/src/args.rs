use std::sync::Arc;

use clap::Parser;
use mergebot_config::{ApiDriver, Config};
use mergebot_core::{CoreModule, TokioSleepService};
use mergebot_ghapi_github::GithubApiService;
use mergebot_ghapi_interface::ApiService;
use mergebot_ghapi_null::NullApiService;
use mergebot_git::{GitService, ProcessGitService, TokioProcessRunner};
use mergebot_sentry::with_sentry_configuration;
use tokio::sync::RwLock;
use tracing::info;

use crate::{
    commands::{Command, CommandContext, SubCommand},
    Result,
};

#[derive(Parser)]
#[command(about = None, long_about = None)]
pub struct Args {
    /// Webhook event name, overrides `BOT_EVENT_NAME`
    #[arg(long, global = true)]
    event_name: Option<String>,

    /// Webhook event payload path, overrides `BOT_EVENT_PATH`
    #[arg(long, global = true)]
    event_path: Option<String>,

    /// Local clone path, overrides `BOT_GIT_WORKDIR`
    #[arg(long, global = true)]
    workdir: Option<String>,

    #[command(subcommand)]
    cmd: SubCommand,
}

impl Args {
    /// Apply command line values on top of the environment configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(name) = &self.event_name {
            config.event.name = name.clone();
        }
        if let Some(path) = &self.event_path {
            config.event.path = path.clone();
        }
        if let Some(workdir) = &self.workdir {
            config.git.workdir = workdir.clone();
        }
    }
}

pub struct CommandExecutor;

impl CommandExecutor {
    pub fn parse_args(config: Config, args: Args) -> Result<()> {
        let sync = |config: Config, args: Args| async move {
            let core_module = CoreModule::builder().build();

            let api_service: Box<dyn ApiService + Send + Sync + 'static> = {
                if config.api.driver == ApiDriver::GitHub {
                    info!("Using GithubApiService API driver");
                    Box::new(GithubApiService::new(config.clone()))
                } else {
                    info!("Using NullApiService API driver");
                    Box::new(NullApiService::new())
                }
            };

            let git_service: Box<dyn GitService + Send + Sync + 'static> = Box::new(
                ProcessGitService::new(&config.git.workdir, TokioProcessRunner::new()),
            );

            let ctx = CommandContext {
                config: config.clone(),
                core_module,
                api_service,
                git_service,
                sleep_service: Box::new(TokioSleepService::new()),
                writer: Arc::new(RwLock::new(std::io::stdout())),
            };

            with_sentry_configuration(&config.clone(), || async {
                Self::parse_args_async(args, ctx).await
            })
            .await
        };

        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?
            .block_on(sync(config, args))
    }

    pub(crate) async fn parse_args_async(args: Args, ctx: CommandContext) -> Result<()> {
        args.cmd.execute(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn overrides_are_applied() {
        let mut config = Config::from_env_no_version();
        config.event.name = "push".into();

        let args = Args::try_parse_from([
            "bot",
            "handle-event",
            "--event-path",
            "/tmp/event.json",
            "--workdir",
            "/tmp/clone",
        ])
        .unwrap();
        args.apply_overrides(&mut config);

        assert_eq!(config.event.name, "push");
        assert_eq!(config.event.path, "/tmp/event.json");
        assert_eq!(config.git.workdir, "/tmp/clone");
    }
}
