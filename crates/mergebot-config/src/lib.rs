//! Config module.

mod drivers;

use std::{env, str::FromStr};

pub use drivers::{ApiDriver, DriverError};

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API driver.
    pub driver: ApiDriver,
    /// GitHub options.
    pub github: ApiGitHubConfig,
}

#[derive(Debug, Clone)]
pub struct ApiGitHubConfig {
    /// GitHub API connect timeout.
    pub connect_timeout: u64,
    /// GitHub API root URL.
    pub root_url: String,
    /// GitHub server URL, used to build git remotes.
    pub server_url: String,
    /// GitHub API access token.
    pub token: String,
    /// GitHub App ID.
    pub app_id: u64,
    /// GitHub App installation ID (0 to look it up from the repository).
    pub app_installation_id: u64,
    /// GitHub App private key.
    pub app_private_key: String,
}

#[derive(Debug, Clone)]
pub struct EventConfig {
    /// Webhook event name.
    pub name: String,
    /// Path of the webhook event payload.
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct GitConfig {
    /// Path of the pre-existing local clone.
    pub workdir: String,
    /// Remote name.
    pub remote: String,
    /// Depth used when fetching a branch.
    pub fetch_depth: u32,
    /// Commits added at each history deepening.
    pub deepen_increment: u32,
    /// Merge base lookup timeout (in milliseconds).
    pub merge_base_timeout: u64,
    /// Committer name for roll-up merges.
    pub user_name: String,
    /// Committer email for roll-up merges.
    pub user_email: String,
}

#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Main integration branch.
    pub main_branch: String,
    /// Exact release branch names.
    pub release_branches: Vec<String>,
    /// Prefix of release branches.
    pub releases_prefix: String,
    /// Label required for automatic merging.
    pub automerge_label: String,
    /// Prefix of rollup conflict reconciliation branches.
    pub fix_branch_prefix: String,
    /// Commit status context posted on rollup conflicts.
    pub status_context: String,
    /// Mergeability probe retries.
    pub probe_retries: u32,
    /// Delay between mergeability probes (in milliseconds).
    pub probe_delay: u64,
    /// Merge attempt retries, after the first attempt.
    pub attempt_retries: u32,
    /// Delay between merge attempts (in milliseconds).
    pub attempt_delay: u64,
    /// Maximum pull requests handled for one push event.
    pub max_pull_requests: u64,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Severity threshold.
    pub level: String,
    /// Use bunyan logging.
    pub use_bunyan: bool,
}

#[derive(Debug, Clone)]
pub struct SentryConfig {
    /// Sentry URL.
    pub url: String,
    /// Traces sample rate (between 0 and 1) for Sentry
    pub traces_sample_rate: f32,
}

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// API options.
    pub api: ApiConfig,
    /// Event options.
    pub event: EventConfig,
    /// Git options.
    pub git: GitConfig,
    /// Merge options.
    pub merge: MergeConfig,
    /// Logging options.
    pub logging: LoggingConfig,
    /// Sentry options.
    pub sentry: SentryConfig,
    /// App version
    pub version: String,
}

impl Config {
    /// Create configuration from environment.
    pub fn from_env(version: String) -> Config {
        Config {
            api: ApiConfig {
                driver: ApiDriver::from_str(&env_to_str("BOT_API_DRIVER", "github"))
                    .unwrap_or(ApiDriver::GitHub),
                github: ApiGitHubConfig {
                    connect_timeout: env_to_u64("BOT_API_GITHUB_CONNECT_TIMEOUT", 5000),
                    root_url: env_to_str("BOT_API_GITHUB_ROOT_URL", "https://api.github.com"),
                    server_url: env_to_str("BOT_API_GITHUB_SERVER_URL", "https://github.com"),
                    token: env_to_str_or("BOT_API_GITHUB_TOKEN", "GITHUB_TOKEN", ""),
                    app_id: env_to_u64("BOT_API_GITHUB_APP_ID", 0),
                    app_installation_id: env_to_u64("BOT_API_GITHUB_APP_INSTALLATION_ID", 0),
                    app_private_key: env_to_str("BOT_API_GITHUB_APP_PRIVATE_KEY", ""),
                },
            },
            event: EventConfig {
                name: env_to_str_or("BOT_EVENT_NAME", "GITHUB_EVENT_NAME", ""),
                path: env_to_str_or("BOT_EVENT_PATH", "GITHUB_EVENT_PATH", ""),
            },
            git: GitConfig {
                workdir: env_to_str_or("BOT_GIT_WORKDIR", "GITHUB_WORKSPACE", "."),
                remote: env_to_str("BOT_GIT_REMOTE", "origin"),
                fetch_depth: env_to_u32("BOT_GIT_FETCH_DEPTH", 50),
                deepen_increment: env_to_u32("BOT_GIT_DEEPEN_INCREMENT", 100),
                merge_base_timeout: env_to_u64("BOT_GIT_MERGE_BASE_TIMEOUT", 300_000),
                user_name: env_to_str("BOT_GIT_USER_NAME", "mergebot"),
                user_email: env_to_str(
                    "BOT_GIT_USER_EMAIL",
                    "mergebot@users.noreply.github.com",
                ),
            },
            merge: MergeConfig {
                main_branch: env_to_str("BOT_MERGE_MAIN_BRANCH", "master"),
                release_branches: env_to_list("BOT_MERGE_RELEASE_BRANCHES", "release"),
                releases_prefix: env_to_str("BOT_MERGE_RELEASES_PREFIX", "releases/"),
                automerge_label: env_to_str("BOT_MERGE_AUTOMERGE_LABEL", "Automerge"),
                fix_branch_prefix: env_to_str("BOT_MERGE_FIX_BRANCH_PREFIX", "fix-rollup-conflict"),
                status_context: env_to_str("BOT_MERGE_STATUS_CONTEXT", "mergebot/rollup"),
                probe_retries: env_to_u32("BOT_MERGE_PROBE_RETRIES", 3),
                probe_delay: env_to_u64("BOT_MERGE_PROBE_DELAY", 2000),
                attempt_retries: env_to_u32("BOT_MERGE_ATTEMPT_RETRIES", 3),
                attempt_delay: env_to_u64("BOT_MERGE_ATTEMPT_DELAY", 10_000),
                max_pull_requests: env_to_u64("BOT_MERGE_MAX_PULL_REQUESTS", 20),
            },
            logging: LoggingConfig {
                level: env_to_str("BOT_LOGGING_LEVEL", "info"),
                use_bunyan: env_to_bool("BOT_LOGGING_USE_BUNYAN", false),
            },
            sentry: SentryConfig {
                url: env_to_str("BOT_SENTRY_URL", ""),
                traces_sample_rate: env_to_f32("BOT_SENTRY_TRACES_SAMPLE_RATE", 0.0),
            },
            version,
        }
    }

    pub fn from_env_no_version() -> Self {
        Self::from_env("0.0.0".into())
    }
}

fn env_to_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .map(|e| e.parse().unwrap_or(default))
        .unwrap_or(default)
}

fn env_to_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .map(|e| e.parse().unwrap_or(default))
        .unwrap_or(default)
}

fn env_to_f32(name: &str, default: f32) -> f32 {
    env::var(name)
        .map(|e| e.parse().unwrap_or(default))
        .unwrap_or(default)
}

fn env_to_bool(name: &str, default: bool) -> bool {
    env::var(name).map(|e| !e.is_empty()).unwrap_or(default)
}

fn env_to_str(name: &str, default: &str) -> String {
    env::var(name)
        .unwrap_or_else(|_e| default.to_string())
        .replace("\\n", "\n")
}

fn env_to_str_or(name: &str, fallback_name: &str, default: &str) -> String {
    env::var(name)
        .or_else(|_e| env::var(fallback_name))
        .unwrap_or_else(|_e| default.to_string())
        .replace("\\n", "\n")
}

fn env_to_list(name: &str, default: &str) -> Vec<String> {
    env_to_str(name, default)
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Into::into)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_values_are_trimmed() {
        env::set_var("BOT_TEST_LIST_VALUES", " release, production ,,");
        assert_eq!(
            env_to_list("BOT_TEST_LIST_VALUES", ""),
            vec!["release".to_string(), "production".to_string()]
        );
    }

    #[test]
    fn fallback_variable_is_used() {
        env::set_var("BOT_TEST_FALLBACK_SECONDARY", "value");
        assert_eq!(
            env_to_str_or("BOT_TEST_FALLBACK_PRIMARY", "BOT_TEST_FALLBACK_SECONDARY", ""),
            "value"
        );
    }

    #[test]
    fn escaped_newlines_are_expanded() {
        env::set_var("BOT_TEST_ESCAPED_KEY", "a\\nb");
        assert_eq!(env_to_str("BOT_TEST_ESCAPED_KEY", ""), "a\nb");
    }
}
