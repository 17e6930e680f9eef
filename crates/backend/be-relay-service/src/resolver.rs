//! Cross-referencing `latest.json` against a release's asset list

use tracing::{debug, instrument};

use crate::{
    error::RelayError,
    host::ReleaseHost,
    types::{MANIFEST_ASSET_NAME, Manifest, Release, ResolvedAsset, UpdateCheck},
    utils::last_path_segment,
};

/// Find the signature and downloadable asset for the client's platform in `release`.
///
/// The manifest and the asset list are published independently, so every
/// step can legitimately fail and each failure has its own error kind.
#[instrument(skip_all, fields(
    tag = %release.tag_name,
    platform_key = %check.platform_key()
))]
pub async fn resolve_platform_asset(
    host: &dyn ReleaseHost,
    release: &Release,
    check: &UpdateCheck,
) -> Result<ResolvedAsset, RelayError> {
    let platform_key = check.platform_key();

    let manifest_asset = release
        .find_asset(MANIFEST_ASSET_NAME)
        .ok_or(RelayError::ManifestMissing)?;
    debug!("Found manifest asset {}", manifest_asset.id);

    let raw = host.fetch_asset_json(&manifest_asset.id).await?;
    let manifest: Manifest = serde_json::from_value(raw)
        .map_err(|e| RelayError::InvalidUpstreamPayload(format!("{MANIFEST_ASSET_NAME}: {e}")))?;

    let entry = manifest
        .platforms
        .get(&platform_key)
        .ok_or_else(|| RelayError::PlatformNotSupported {
            platform_key: platform_key.clone(),
            platform: check.platform(),
        })?;

    let asset_name = last_path_segment(&entry.url);
    debug!("Manifest points {} at {}", platform_key, asset_name);

    let asset = release
        .find_asset(asset_name)
        .ok_or_else(|| RelayError::AssetNotFound {
            platform_key: platform_key.clone(),
            platform: check.platform(),
            asset_name: asset_name.to_string(),
        })?;

    Ok(ResolvedAsset {
        signature: entry.signature.clone(),
        asset_id: asset.id.clone(),
        asset_name: asset.name.clone(),
    })
}
