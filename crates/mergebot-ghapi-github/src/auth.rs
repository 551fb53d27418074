//! Auth.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use http::{header, HeaderMap};
use mergebot_config::Config;
use mergebot_crypto::JwtUtils;
use mergebot_ghapi_interface::ApiService;
use reqwest::ClientBuilder;
use serde::{Deserialize, Serialize};

use crate::errors::GitHubError;

const GITHUB_ACCEPT_HEADER: &str = "application/vnd.github+json";
const APP_TOKEN_LIFETIME_IN_SECONDS: u64 = 600;

#[derive(Debug, Serialize, Deserialize)]
struct JwtClaims {
    iat: u64,
    exp: u64,
    iss: u64,
}

/// Get a GitHub client builder authenticated with a token.
pub fn get_authenticated_client_builder(
    config: &Config,
    token: &str,
) -> Result<ClientBuilder, GitHubError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static(GITHUB_ACCEPT_HEADER),
    );
    headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {token}"))?,
    );

    Ok(base_client_builder(config).default_headers(headers))
}

/// Get anonymous GitHub client builder.
pub fn get_anonymous_client_builder(config: &Config) -> ClientBuilder {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static(GITHUB_ACCEPT_HEADER),
    );

    base_client_builder(config).default_headers(headers)
}

fn base_client_builder(config: &Config) -> ClientBuilder {
    ClientBuilder::new()
        .connect_timeout(Duration::from_millis(config.api.github.connect_timeout))
        .user_agent(format!("mergebot/{}", config.version))
}

/// Build a GitHub URL.
pub fn build_github_url<T: Into<String>>(config: &Config, path: T) -> String {
    format!("{}{}", config.api.github.root_url, path.into())
}

fn now_timestamp() -> Result<u64, GitHubError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| GitHubError::ImplementationError { source: e.into() })
}

/// Create a JWT authenticating as the GitHub App.
pub fn create_app_token(config: &Config) -> Result<String, GitHubError> {
    // https://docs.github.com/en/apps/creating-github-apps/authenticating-with-a-github-app/generating-a-json-web-token-jwt-for-a-github-app

    let now_ts = now_timestamp()?;
    let claims = JwtClaims {
        iat: now_ts,
        exp: now_ts + APP_TOKEN_LIFETIME_IN_SECONDS,
        iss: config.api.github.app_id,
    };

    JwtUtils::create_jwt(&config.api.github.app_private_key, &claims)
        .map_err(|e| GitHubError::ImplementationError { source: e.into() })
}

/// Create an installation access token for a repository.
///
/// The installation is looked up from the repository when no installation
/// identifier is configured.
#[tracing::instrument(skip(config, api_service))]
pub async fn create_installation_access_token(
    config: &Config,
    api_service: &dyn ApiService,
    owner: &str,
    name: &str,
) -> Result<String, GitHubError> {
    let auth_token = create_app_token(config)?;
    let installation_id = match config.api.github.app_installation_id {
        0 => api_service
            .repository_installation_get(&auth_token, owner, name)
            .await
            .map_err(|e| GitHubError::ImplementationError { source: e.into() })?,
        id => id,
    };

    api_service
        .installations_create_token(&auth_token, installation_id)
        .await
        .map_err(|e| GitHubError::ImplementationError { source: e.into() })
}
