//! In-memory release host shared by the unit tests

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::{TimeZone, Utc};
use futures_util::{StreamExt, stream};
use serde_json::json;

use crate::{
    error::RelayError,
    host::{AssetBytes, ReleaseHost},
    types::{AssetId, Release, ReleaseAsset},
};

/// Release `v1.4.0` with `latest.json` (id 1) and `app-1.4.0-x86_64.bin` (id 2)
pub fn sample_release() -> Release {
    Release {
        tag_name: "v1.4.0".into(),
        published_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
        body: Some("Bug fixes".into()),
        assets: vec![
            ReleaseAsset {
                id: AssetId::new("1"),
                name: "latest.json".into(),
            },
            ReleaseAsset {
                id: AssetId::new("2"),
                name: "app-1.4.0-x86_64.bin".into(),
            },
        ],
    }
}

pub fn sample_manifest() -> serde_json::Value {
    json!({
        "version": "1.4.0",
        "platforms": {
            "linux-x86_64": {
                "signature": "SIG",
                "url": "https://github.com/acme/desktop/releases/download/v1.4.0/app-1.4.0-x86_64.bin"
            }
        }
    })
}

fn not_found(what: &str) -> RelayError {
    RelayError::Upstream {
        status: Some(404),
        message: format!("{what}: Not Found"),
    }
}

pub struct StaticReleaseHost {
    release: Option<Release>,
    json: HashMap<String, serde_json::Value>,
    bytes: HashMap<String, Vec<u8>>,
    calls: Mutex<Vec<String>>,
}

impl StaticReleaseHost {
    pub fn new(release: Release) -> Self {
        Self {
            release: Some(release),
            json: HashMap::new(),
            bytes: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A host whose every call fails
    pub fn unavailable() -> Self {
        Self {
            release: None,
            json: HashMap::new(),
            bytes: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_json(mut self, id: &str, value: serde_json::Value) -> Self {
        self.json.insert(id.to_string(), value);
        self
    }

    pub fn with_bytes(mut self, id: &str, bytes: &[u8]) -> Self {
        self.bytes.insert(id.to_string(), bytes.to_vec());
        self
    }

    /// Names of the trait methods called so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

#[async_trait]
impl ReleaseHost for StaticReleaseHost {
    async fn latest_release(&self) -> Result<Release, RelayError> {
        self.record("latest_release");
        self.release
            .clone()
            .ok_or_else(|| not_found("Failed to fetch latest release"))
    }

    async fn fetch_asset_json(&self, id: &AssetId) -> Result<serde_json::Value, RelayError> {
        self.record("fetch_asset_json");
        self.json
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| not_found(&format!("Failed to fetch asset {id}")))
    }

    async fn fetch_asset_bytes(&self, id: &AssetId) -> Result<AssetBytes, RelayError> {
        self.record("fetch_asset_bytes");
        let data = self
            .bytes
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| not_found(&format!("Failed to fetch asset {id}")))?;

        // two chunks, to exercise streaming
        let split = data.len() / 2;
        let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::copy_from_slice(&data[..split])),
            Ok(Bytes::copy_from_slice(&data[split..])),
        ];
        Ok(AssetBytes {
            content_length: Some(data.len() as u64),
            stream: stream::iter(chunks).boxed(),
        })
    }
}
