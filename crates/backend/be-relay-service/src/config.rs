use std::net::SocketAddr;

use axum::http::HeaderValue;
use secrecy::SecretString;

use crate::{error::RelayError, version::VersionOrdering};

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:3000";

/// Where releases are read from and the credential used to read them.
#[derive(Debug)]
pub struct UpstreamConfig {
    /// Bearer token for the private repository. Never sent to callers.
    pub token: Option<SecretString>,
    pub repo_owner: String,
    pub repo_name: String,
    pub api_base_url: String,
}

#[derive(Debug)]
pub struct RelayConfig {
    pub upstream: UpstreamConfig,
    /// Origin used in descriptor download links. Derived from the request
    /// when unset.
    pub public_base_url: Option<String>,
    pub http_addr: SocketAddr,
    pub version_ordering: VersionOrdering,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, RelayError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source. Empty values are
    /// treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let token = var("GITHUB_TOKEN").map(SecretString::from);

        let repo_owner = var("RELEASE_REPO_OWNER").ok_or_else(|| {
            RelayError::Config("RELEASE_REPO_OWNER environment variable must be set".into())
        })?;

        let repo_name = var("RELEASE_REPO_NAME").ok_or_else(|| {
            RelayError::Config("RELEASE_REPO_NAME environment variable must be set".into())
        })?;

        let api_base_url = var("GITHUB_API_URL")
            .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let public_base_url = match var("PUBLIC_BASE_URL") {
            Some(url) => {
                let url = url.trim_end_matches('/').to_string();
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(RelayError::Config(format!(
                        "PUBLIC_BASE_URL '{url}' must start with http:// or https://"
                    )));
                }
                HeaderValue::from_str(&url).map_err(|e| {
                    RelayError::Config(format!(
                        "PUBLIC_BASE_URL '{url}' is not a valid header value: {e}"
                    ))
                })?;
                Some(url)
            }
            None => None,
        };

        let http_addr = var("HTTP_ADDR")
            .unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| RelayError::Config(format!("Invalid HTTP_ADDR format: {e}")))?;

        let version_ordering = match var("VERSION_ORDERING") {
            Some(value) => value.parse().map_err(RelayError::Config)?,
            None => VersionOrdering::default(),
        };

        Ok(Self {
            upstream: UpstreamConfig {
                token,
                repo_owner,
                repo_name,
                api_base_url,
            },
            public_base_url,
            http_addr,
            version_ordering,
        })
    }
}
