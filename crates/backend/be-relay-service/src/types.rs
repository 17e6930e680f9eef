//! Data types and structures for the update relay

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Name of the release asset that carries the per-platform manifest
pub const MANIFEST_ASSET_NAME: &str = "latest.json";

/// Opaque identifier of a release asset on the upstream host.
///
/// GitHub sends numeric ids, but nothing in the relay depends on that, so
/// both JSON numbers and strings are accepted.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AssetId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => AssetId(n.to_string()),
            RawId::Text(s) => AssetId(s),
        })
    }
}

/// One file attached to a release
#[derive(Deserialize, Debug, Clone)]
pub struct ReleaseAsset {
    pub id: AssetId,
    pub name: String,
}

/// Latest published release as reported by the upstream host
#[derive(Deserialize, Debug, Clone)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// Release notes
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// Find an asset by exact, case-sensitive name
    pub fn find_asset(&self, name: &str) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|asset| asset.name == name)
    }
}

/// Signature and download location for one platform in `latest.json`
#[derive(Deserialize, Debug, Clone)]
pub struct PlatformEntry {
    pub signature: String,
    pub url: String,
}

/// Parsed body of the `latest.json` manifest asset
#[derive(Deserialize, Debug, Clone)]
pub struct Manifest {
    pub platforms: BTreeMap<String, PlatformEntry>,
}

/// Path parameters of an update check, e.g. `/linux/x86_64/v1.3.9`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCheck {
    pub target: String,
    pub arch: String,
    /// Client version with any leading `v` already stripped
    pub current_version: String,
}

impl UpdateCheck {
    /// Manifest key for this client, `"{target}-{arch}"`
    pub fn platform_key(&self) -> String {
        format!("{}-{}", self.target, self.arch)
    }

    /// Platform as the client addressed it, `"{target}/{arch}"`
    pub fn platform(&self) -> String {
        format!("{}/{}", self.target, self.arch)
    }
}

/// The manifest entry cross-referenced against the release asset list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub signature: String,
    pub asset_id: AssetId,
    pub asset_name: String,
}

/// Tauri updater response format (dynamic server)
#[derive(Serialize, Deserialize, Debug)]
pub struct UpdateResponse {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<String>,
    pub url: String,
    pub signature: String,
    pub notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_accepts_numeric_and_string_asset_ids() {
        let release: Release = serde_json::from_value(serde_json::json!({
            "tag_name": "v1.4.0",
            "published_at": "2024-05-01T12:00:00Z",
            "body": "Bug fixes",
            "html_url": "https://github.com/acme/app/releases/tag/v1.4.0",
            "assets": [
                { "id": 101, "name": "latest.json", "size": 512 },
                { "id": "abc", "name": "app-1.4.0-x86_64.bin" }
            ]
        }))
        .unwrap();

        assert_eq!(release.assets[0].id.as_str(), "101");
        assert_eq!(release.assets[1].id.as_str(), "abc");
        assert_eq!(release.body.as_deref(), Some("Bug fixes"));
    }

    #[test]
    fn release_tolerates_missing_optional_fields() {
        let release: Release = serde_json::from_value(serde_json::json!({
            "tag_name": "v0.1.0",
            "published_at": null,
            "body": null
        }))
        .unwrap();

        assert!(release.published_at.is_none());
        assert!(release.assets.is_empty());
    }

    #[test]
    fn find_asset_is_exact_and_case_sensitive() {
        let release = Release {
            tag_name: "v1.0.0".into(),
            published_at: None,
            body: None,
            assets: vec![ReleaseAsset {
                id: AssetId::new("1"),
                name: "App.bin".into(),
            }],
        };

        assert!(release.find_asset("App.bin").is_some());
        assert!(release.find_asset("app.bin").is_none());
        assert!(release.find_asset("App.bin.sig").is_none());
    }

    #[test]
    fn update_response_omits_missing_pub_date() {
        let response = UpdateResponse {
            version: "1.0.0".into(),
            pub_date: None,
            url: "http://relay/download/1/app.bin".into(),
            signature: "SIG".into(),
            notes: String::new(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("pub_date").is_none());
        assert_eq!(value["signature"], "SIG");
    }
}
