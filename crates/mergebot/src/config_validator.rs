//! Validation utilities.

use mergebot_config::{ApiDriver, Config};
use mergebot_crypto::JwtUtils;
use thiserror::Error;

enum ApiConfigError {
    MissingToken,
    MissingAppId,
    MissingPrivateKey,
    InvalidPrivateKey,
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Errors on environment variables:\n{}", errors)]
    EnvVarsError { errors: String },
}

fn validate_env_vars(config: &Config) -> Result<(), ValidationError> {
    #[inline]
    fn _missing(error: &mut String, name: &str) {
        error.push_str(&format!("\n  - Missing env. var.: {}", name));
    }

    #[inline]
    fn _invalid_key(error: &mut String, name: &str) {
        error.push_str(&format!("\n  - Invalid private key: {}", name));
    }

    let mut error = String::new();

    // Check event configuration
    if config.event.name.is_empty() {
        _missing(&mut error, "BOT_EVENT_NAME");
    }
    if config.event.path.is_empty() {
        _missing(&mut error, "BOT_EVENT_PATH");
    }

    // Check git configuration
    if config.git.workdir.is_empty() {
        _missing(&mut error, "BOT_GIT_WORKDIR");
    }
    if config.git.remote.is_empty() {
        _missing(&mut error, "BOT_GIT_REMOTE");
    }

    // Check branch configuration
    if config.merge.main_branch.is_empty() {
        _missing(&mut error, "BOT_MERGE_MAIN_BRANCH");
    }

    // Check API credentials: token or private key
    if config.api.driver == ApiDriver::GitHub {
        match validate_api_credentials(config) {
            Err(ApiConfigError::MissingToken) => {
                _missing(&mut error, "BOT_API_GITHUB_TOKEN");
            }
            Err(ApiConfigError::MissingAppId) => {
                _missing(&mut error, "BOT_API_GITHUB_APP_ID");
            }
            Err(ApiConfigError::InvalidPrivateKey) => {
                _invalid_key(&mut error, "BOT_API_GITHUB_APP_PRIVATE_KEY");
            }
            _ => (),
        }
    }

    if error.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::EnvVarsError { errors: error })
    }
}

fn validate_api_credentials(config: &Config) -> Result<(), ApiConfigError> {
    // Check token first
    if config.api.github.token.is_empty() {
        match validate_github_app_config(config) {
            // If private key is missing, you might want to use token instead.
            Err(ApiConfigError::MissingPrivateKey) => Err(ApiConfigError::MissingToken),
            res => res,
        }
    } else {
        Ok(())
    }
}

/// The installation ID is optional, it is looked up from the repository when missing.
fn validate_github_app_config(config: &Config) -> Result<(), ApiConfigError> {
    // Check Private key
    if config.api.github.app_private_key.is_empty() {
        Err(ApiConfigError::MissingPrivateKey)
    } else {
        match JwtUtils::parse_encoding_key(&config.api.github.app_private_key) {
            Err(_) => Err(ApiConfigError::InvalidPrivateKey),
            Ok(_) => {
                // Check App ID
                if config.api.github.app_id == 0 {
                    Err(ApiConfigError::MissingAppId)
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Validate configuration.
pub fn validate_configuration(config: &Config) -> Result<(), ValidationError> {
    validate_env_vars(config)
}
