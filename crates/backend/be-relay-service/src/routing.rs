//! Request classification.
//!
//! Every inbound request is turned into a [`RelayRequest`] before any handler
//! logic runs. The table below is the only place routes are decided:
//!
//! | method / path                       | variant       |
//! |-------------------------------------|---------------|
//! | `OPTIONS`, any path                 | `Preflight`   |
//! | `/download/{asset_id}/{asset_name}` | `Download`    |
//! | `/{target}/{arch}/{version}`        | `CheckUpdate` |
//! | anything else                       | `Malformed`   |

use axum::http::Method;
use percent_encoding::percent_decode_str;

use crate::{
    types::{AssetId, UpdateCheck},
    utils::path_segments,
    version,
};

const DOWNLOAD_SEGMENT: &str = "download";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayRequest {
    Preflight,
    Download { asset_id: AssetId, file_name: String },
    CheckUpdate(UpdateCheck),
    Malformed(String),
}

impl RelayRequest {
    pub fn classify(method: &Method, path: &str) -> Self {
        if method == Method::OPTIONS {
            return RelayRequest::Preflight;
        }

        match path_segments(path).as_slice() {
            [DOWNLOAD_SEGMENT, asset_id, asset_name] => classify_download(asset_id, asset_name),
            [target, arch, current_version] => {
                let current_version = version::normalize(current_version);
                if current_version.is_empty() {
                    return RelayRequest::Malformed("version must not be empty".into());
                }
                RelayRequest::CheckUpdate(UpdateCheck {
                    target: target.to_string(),
                    arch: arch.to_string(),
                    current_version: current_version.to_string(),
                })
            }
            segments => RelayRequest::Malformed(format!(
                "expected /{{target}}/{{arch}}/{{version}}, got {} path segment(s)",
                segments.len()
            )),
        }
    }
}

fn classify_download(asset_id: &str, asset_name: &str) -> RelayRequest {
    // The id ends up in the upstream URL path
    if !asset_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return RelayRequest::Malformed(format!("invalid asset id '{asset_id}'"));
    }

    // The name ends up inside a quoted Content-Disposition value
    let file_name = match percent_decode_str(asset_name).decode_utf8() {
        Ok(name) => name.into_owned(),
        Err(_) => return RelayRequest::Malformed("asset name is not valid UTF-8".into()),
    };
    if file_name.is_empty()
        || file_name
            .chars()
            .any(|c| c == '"' || c == '\\' || c.is_control())
    {
        return RelayRequest::Malformed(format!("invalid asset name '{asset_name}'"));
    }

    RelayRequest::Download {
        asset_id: AssetId::new(asset_id),
        file_name,
    }
}
