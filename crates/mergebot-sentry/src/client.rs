use std::{future::Future, str::FromStr};

use mergebot_config::Config;
use sentry::{integrations::debug_images::DebugImagesIntegration, types::Dsn, ClientOptions};
use tracing::{info, warn};

/// Configure Sentry integration by wrapping a function.
///
/// The client stays alive until `func` completes, so events raised while
/// handling the webhook are flushed before the process exits.
pub async fn with_sentry_configuration<T, Fut, R>(config: &Config, func: T) -> R
where
    T: FnOnce() -> Fut,
    Fut: Future<Output = R>,
{
    let _guard = build_client_options(config).map(|options| {
        info!("Sentry integration enabled.");

        // Enable backtraces
        std::env::set_var("RUST_BACKTRACE", "1");
        sentry::init(options)
    });

    func().await
}

fn build_client_options(config: &Config) -> Option<ClientOptions> {
    if config.sentry.url.is_empty() {
        return None;
    }

    let dsn = match Dsn::from_str(&config.sentry.url) {
        Ok(dsn) => dsn,
        Err(e) => {
            warn!(error = %e, message = "Invalid Sentry URL, integration disabled");
            return None;
        }
    };

    let mut options = ClientOptions::new().add_integration(DebugImagesIntegration::default());
    options.dsn = Some(dsn);
    options.default_integrations = true;
    options.in_app_exclude.push("sentry");
    options.in_app_exclude.push("tokio");
    options.in_app_exclude.push("reqwest");
    options.release = Some(config.version.to_string().into());
    options.attach_stacktrace = true;
    options.traces_sample_rate = config.sentry.traces_sample_rate;
    options.debug = false;

    Some(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_without_url() {
        let mut config = Config::from_env_no_version();
        config.sentry.url = String::new();
        assert!(build_client_options(&config).is_none());

        config.sentry.url = "not a dsn".into();
        assert!(build_client_options(&config).is_none());
    }

    #[test]
    fn options_from_config() {
        let mut config = Config::from_env("1.2.3".into());
        config.sentry.url = "https://key@sentry.example.com/42".into();
        config.sentry.traces_sample_rate = 0.5;

        let options = build_client_options(&config).unwrap();
        assert_eq!(options.release.as_deref(), Some("1.2.3"));
        assert_eq!(options.traces_sample_rate, 0.5);
    }

    #[tokio::test]
    async fn wrapped_function_result_is_returned() {
        let mut config = Config::from_env_no_version();
        config.sentry.url = String::new();

        let result = with_sentry_configuration(&config, || async { 42 }).await;
        assert_eq!(result, 42);
    }
}
