//! Update check pipeline

use std::sync::Arc;

use chrono::SecondsFormat;
use tracing::{debug, instrument};

use crate::{
    config::RelayConfig,
    error::RelayError,
    host::{AssetBytes, GitHubReleaseHost, ReleaseHost},
    resolver::resolve_platform_asset,
    types::{AssetId, UpdateCheck, UpdateResponse},
    utils::encode_path_segment,
    version::{self, VersionOrdering},
};

/// Shared, read-only state for every request
#[derive(Clone)]
pub struct AppState {
    host: Arc<dyn ReleaseHost>,
    version_ordering: VersionOrdering,
    public_base_url: Option<String>,
}

impl AppState {
    pub fn new(
        host: Arc<dyn ReleaseHost>,
        version_ordering: VersionOrdering,
        public_base_url: Option<String>,
    ) -> Self {
        Self {
            host,
            version_ordering,
            public_base_url,
        }
    }

    /// Build the state with a GitHub client carrying the configured credential
    #[instrument(skip_all, fields(
        owner = %config.upstream.repo_owner,
        repo = %config.upstream.repo_name,
        ordering = %config.version_ordering
    ))]
    pub fn from_config(config: RelayConfig) -> Result<Self, RelayError> {
        debug!("Creating GitHub release host");
        let host = GitHubReleaseHost::new(config.upstream)?;
        Ok(Self::new(
            Arc::new(host),
            config.version_ordering,
            config.public_base_url,
        ))
    }

    pub fn public_base_url(&self) -> Option<&str> {
        self.public_base_url.as_deref()
    }

    /// Check whether a newer release exists for the client's platform.
    ///
    /// Returns `Ok(None)` when the client is up to date. `origin` is the
    /// scheme and authority used to build the download link.
    #[instrument(skip(self), fields(
        target = %check.target,
        arch = %check.arch,
        current_version = %check.current_version
    ))]
    pub async fn check_for_update(
        &self,
        check: &UpdateCheck,
        origin: &str,
    ) -> Result<Option<UpdateResponse>, RelayError> {
        // The router never produces empty segments; direct callers can
        if check.target.is_empty() || check.arch.is_empty() || check.current_version.is_empty() {
            return Err(RelayError::Malformed(
                "target, arch and version are required".into(),
            ));
        }

        let current = check.current_version.as_str();
        let release = self.host.latest_release().await?;
        let latest = version::normalize(&release.tag_name);
        debug!("Latest version: {}, client version: {}", latest, current);

        if version::is_up_to_date(current, latest, self.version_ordering) {
            debug!("No update available");
            return Ok(None);
        }

        let resolved = resolve_platform_asset(self.host.as_ref(), &release, check).await?;

        let update = UpdateResponse {
            version: latest.to_string(),
            pub_date: release
                .published_at
                .map(|date| date.to_rfc3339_opts(SecondsFormat::Secs, true)),
            url: format!(
                "{}/download/{}/{}",
                origin,
                resolved.asset_id,
                encode_path_segment(&resolved.asset_name)
            ),
            signature: resolved.signature,
            notes: release.body.unwrap_or_default(),
        };
        debug!(url = %update.url, "Update available");

        Ok(Some(update))
    }

    /// Open a byte stream for an asset chosen by the caller
    #[instrument(skip(self), fields(asset_id = %asset_id))]
    pub async fn download_asset(&self, asset_id: &AssetId) -> Result<AssetBytes, RelayError> {
        self.host.fetch_asset_bytes(asset_id).await
    }
}
