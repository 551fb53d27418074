use mergebot_config::Config;
use mergebot_ghapi_interface::ApiService;
use mergebot_git::GitService;

use crate::{sleep::SleepService, CoreModule};

pub struct CoreContext<'a> {
    pub config: &'a Config,
    pub core_module: &'a CoreModule,
    pub api_service: &'a (dyn ApiService + 'a),
    pub git_service: &'a (dyn GitService + 'a),
    pub sleep_service: &'a (dyn SleepService + 'a),
}

#[cfg(any(test, feature = "testkit"))]
pub(crate) mod tests {
    use mergebot_config::Config;
    use mergebot_ghapi_interface::MockApiService;
    use mergebot_git::MockGitService;

    use crate::{sleep::MockSleepService, CoreContext, CoreModule};

    #[allow(dead_code)]
    pub struct CoreContextTest {
        pub config: Config,
        pub core_module: CoreModule,
        pub api_service: MockApiService,
        pub git_service: MockGitService,
        pub sleep_service: MockSleepService,
    }

    impl CoreContextTest {
        #[allow(dead_code)]
        pub fn new() -> Self {
            let mut config = Config::from_env_no_version();
            config.merge.main_branch = "master".into();
            config.merge.release_branches = vec!["release".into()];
            config.merge.releases_prefix = "releases/".into();
            config.merge.automerge_label = "Automerge".into();
            config.merge.fix_branch_prefix = "fix-rollup-conflict".into();
            config.merge.status_context = "mergebot/rollup".into();
            config.merge.probe_retries = 3;
            config.merge.probe_delay = 2000;
            config.merge.attempt_retries = 3;
            config.merge.attempt_delay = 10_000;
            config.merge.max_pull_requests = 20;
            config.git.remote = "origin".into();
            config.git.fetch_depth = 50;
            config.git.deepen_increment = 100;
            config.git.merge_base_timeout = 300_000;
            config.git.user_name = "mergebot".into();
            config.git.user_email = "mergebot@users.noreply.github.com".into();
            config.api.github.server_url = "https://github.com".into();
            config.api.github.app_id = 0;
            config.api.github.token = "token".into();

            Self {
                config,
                core_module: CoreModule::builder().build(),
                api_service: MockApiService::new(),
                git_service: MockGitService::new(),
                sleep_service: MockSleepService::new(),
            }
        }

        #[allow(dead_code)]
        pub fn as_context(&self) -> CoreContext {
            CoreContext {
                config: &self.config,
                core_module: &self.core_module,
                api_service: &self.api_service,
                git_service: &self.git_service,
                sleep_service: &self.sleep_service,
            }
        }
    }
}
