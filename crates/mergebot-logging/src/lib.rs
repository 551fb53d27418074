//! Log configuration.

#![warn(clippy::all)]

use std::str::FromStr;

use mergebot_config::Config;
use mergebot_sentry::sentry;
use thiserror::Error;
use tracing::Subscriber;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_error::ErrorLayer;
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};
use tracing_tree::HierarchicalLayer;

const NOISY_CRATES: &[&str] = &["hyper=warn", "reqwest=warn", "rustls=warn"];

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error(
        "Could not set tracing global default subscriber,\n  caused by: {}",
        source
    )]
    TracingSetGlobalDefaultError {
        source: tracing::dispatcher::SetGlobalDefaultError,
    },
    #[error("Could not initialize tracing log tracer,\n  caused by: {}", source)]
    TracingLogTracerError { source: tracing_log::log::SetLoggerError },
    #[error(
        "Wrong env filter configuration: {}\n  caused by: {}",
        configuration,
        source
    )]
    EnvFilterConfigurationError {
        source: tracing_subscriber::filter::ParseError,
        configuration: String,
    },
}

/// Filter directives: `RUST_LOG` when set, the configured level otherwise.
fn filter_directives(config: &Config, rust_log: Option<String>) -> String {
    match rust_log {
        Some(directives) if !directives.is_empty() => directives,
        _ => {
            let mut directives = vec![config.logging.level.to_lowercase()];
            directives.extend(NOISY_CRATES.iter().map(|d| d.to_string()));
            directives.join(",")
        }
    }
}

/// Build the subscriber, without installing it.
pub fn build_subscriber(
    config: &Config,
) -> Result<Box<dyn Subscriber + Send + Sync>, LoggingError> {
    let log_config = filter_directives(config, std::env::var("RUST_LOG").ok());
    let app_name = concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION")).to_string();

    let filter_layer = EnvFilter::from_str(&log_config).map_err(|e| {
        LoggingError::EnvFilterConfigurationError {
            source: e,
            configuration: log_config,
        }
    })?;
    let hierarchical_layer = HierarchicalLayer::new(2)
        .with_writer(std::io::stderr)
        .with_targets(true)
        .with_bracketed_fields(true);
    let error_layer = ErrorLayer::default();
    let json_storage_layer = config.logging.use_bunyan.then_some(JsonStorageLayer);
    let bunyan_layer = config
        .logging
        .use_bunyan
        .then(|| BunyanFormattingLayer::new(app_name, std::io::stdout));
    let sentry_layer = sentry::integrations::tracing::layer();

    let subscriber = tracing_subscriber::registry()
        .with(error_layer)
        .with(hierarchical_layer)
        .with(filter_layer)
        .with(json_storage_layer)
        .with(bunyan_layer)
        .with(sentry_layer);

    Ok(Box::new(subscriber))
}

/// Configure logging for the whole process.
pub fn configure_logging(config: &Config) -> Result<(), LoggingError> {
    LogTracer::init().map_err(|e| LoggingError::TracingLogTracerError { source: e })?;

    tracing::subscriber::set_global_default(build_subscriber(config)?)
        .map_err(|e| LoggingError::TracingSetGlobalDefaultError { source: e })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_level_is_used() {
        let mut config = Config::from_env_no_version();
        config.logging.level = "DEBUG".into();

        assert_eq!(
            filter_directives(&config, None),
            "debug,hyper=warn,reqwest=warn,rustls=warn"
        );
        assert_eq!(
            filter_directives(&config, Some(String::new())),
            "debug,hyper=warn,reqwest=warn,rustls=warn"
        );
    }

    #[test]
    fn rust_log_overrides_level() {
        let config = Config::from_env_no_version();
        assert_eq!(
            filter_directives(&config, Some("mergebot_core=trace".into())),
            "mergebot_core=trace"
        );
    }

    #[test]
    fn subscriber_can_be_scoped() {
        let mut config = Config::from_env_no_version();
        config.logging.use_bunyan = true;

        let subscriber = build_subscriber(&config).unwrap();
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(message = "scoped");
        });
    }
}
