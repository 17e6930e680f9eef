//! Authenticated access to the upstream release host

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use futures_util::{StreamExt, TryStreamExt, stream::BoxStream};
use reqwest::{StatusCode, header};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use crate::{
    config::UpstreamConfig,
    error::RelayError,
    types::{AssetId, Release},
};

const USER_AGENT: &str = concat!("eurora-update-relay/", env!("CARGO_PKG_VERSION"));
const GITHUB_JSON: &str = "application/vnd.github+json";
const OCTET_STREAM: &str = "application/octet-stream";

pub type ByteStream = BoxStream<'static, Result<Bytes, std::io::Error>>;

/// Raw asset content on its way to a caller
pub struct AssetBytes {
    /// Upstream `Content-Length`, when it was sent
    pub content_length: Option<u64>,
    pub stream: ByteStream,
}

impl std::fmt::Debug for AssetBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetBytes")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// The private release host the relay fronts.
///
/// Calls are single-shot: a failed request is reported, never retried.
#[async_trait]
pub trait ReleaseHost: Send + Sync {
    /// Most recent published release
    async fn latest_release(&self) -> Result<Release, RelayError>;

    /// Download an asset and parse it as JSON
    async fn fetch_asset_json(&self, id: &AssetId) -> Result<serde_json::Value, RelayError>;

    /// Download an asset as a byte stream, for passing through to a caller
    async fn fetch_asset_bytes(&self, id: &AssetId) -> Result<AssetBytes, RelayError>;
}

/// [`ReleaseHost`] backed by the GitHub REST API
pub struct GitHubReleaseHost {
    http: reqwest::Client,
    api_base_url: String,
    repo_owner: String,
    repo_name: String,
    token: Option<SecretString>,
}

impl GitHubReleaseHost {
    pub fn new(config: UpstreamConfig) -> Result<Self, RelayError> {
        // No total timeout: installers can take a while to stream through.
        let http = reqwest::ClientBuilder::new()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| RelayError::Config(format!("Failed to build HTTP client: {e}")))?;

        if config.token.is_none() {
            tracing::warn!("GITHUB_TOKEN not set, upstream requests will fail");
        }

        Ok(Self {
            http,
            api_base_url: config.api_base_url,
            repo_owner: config.repo_owner,
            repo_name: config.repo_name,
            token: config.token,
        })
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base_url, self.repo_owner, self.repo_name, path
        )
    }

    /// Send an authorized GET and turn any non-success status into
    /// [`RelayError::Upstream`] prefixed with `context`.
    async fn get(
        &self,
        url: &str,
        accept: &'static str,
        context: &str,
    ) -> Result<reqwest::Response, RelayError> {
        let token = self.token.as_ref().ok_or_else(|| RelayError::Upstream {
            status: Some(StatusCode::UNAUTHORIZED.as_u16()),
            message: format!("{context}: Upstream credential is not configured"),
        })?;

        debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, accept)
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", token.expose_secret()),
            )
            .send()
            .await
            .map_err(|e| RelayError::Upstream {
                status: None,
                message: format!("{context}: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or(status.as_str());
            return Err(RelayError::Upstream {
                status: Some(status.as_u16()),
                message: format!("{context}: {reason}"),
            });
        }

        Ok(response)
    }

    async fn read_body(response: reqwest::Response, context: &str) -> Result<Bytes, RelayError> {
        response.bytes().await.map_err(|e| RelayError::Upstream {
            status: None,
            message: format!("{context}: {e}"),
        })
    }
}

#[async_trait]
impl ReleaseHost for GitHubReleaseHost {
    #[instrument(skip(self), fields(owner = %self.repo_owner, repo = %self.repo_name))]
    async fn latest_release(&self) -> Result<Release, RelayError> {
        let context = "Failed to fetch latest release";
        let response = self
            .get(&self.repo_url("releases/latest"), GITHUB_JSON, context)
            .await?;
        let body = Self::read_body(response, context).await?;

        let release: Release = serde_json::from_slice(&body)
            .map_err(|e| RelayError::InvalidUpstreamPayload(format!("release metadata: {e}")))?;
        debug!(
            "Latest release {} with {} assets",
            release.tag_name,
            release.assets.len()
        );
        Ok(release)
    }

    #[instrument(skip(self), fields(asset_id = %id))]
    async fn fetch_asset_json(&self, id: &AssetId) -> Result<serde_json::Value, RelayError> {
        let context = format!("Failed to fetch asset {id}");
        let response = self
            .get(
                &self.repo_url(&format!("releases/assets/{id}")),
                OCTET_STREAM,
                &context,
            )
            .await?;
        let body = Self::read_body(response, &context).await?;

        serde_json::from_slice(&body)
            .map_err(|e| RelayError::InvalidUpstreamPayload(format!("asset {id}: {e}")))
    }

    #[instrument(skip(self), fields(asset_id = %id))]
    async fn fetch_asset_bytes(&self, id: &AssetId) -> Result<AssetBytes, RelayError> {
        let context = format!("Failed to fetch asset {id}");
        let response = self
            .get(
                &self.repo_url(&format!("releases/assets/{id}")),
                OCTET_STREAM,
                &context,
            )
            .await?;

        let content_length = response.content_length();
        debug!(?content_length, "Streaming asset {}", id);

        Ok(AssetBytes {
            content_length,
            stream: response
                .bytes_stream()
                .map_err(std::io::Error::other)
                .boxed(),
        })
    }
}
