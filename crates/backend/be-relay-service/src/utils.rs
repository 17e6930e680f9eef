//! Utility functions for path handling

use axum::http::{HeaderMap, header};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use tracing::debug;

const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Characters that cannot appear raw inside a single URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Split a request path into its non-empty segments.
/// e.g., "//linux/x86_64/1.0.0/" -> ["linux", "x86_64", "1.0.0"]
pub fn path_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Final path segment of a URL, ignoring any query string or fragment.
/// e.g., "https://host/releases/download/v1.0.0/app.bin?raw=1" -> "app.bin"
pub fn last_path_segment(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path)
}

/// Percent-encode `segment` so it survives as one path segment and decodes
/// back to the same string.
pub fn encode_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Scheme and authority used for links back to this service.
///
/// A configured public URL wins. Otherwise the origin is rebuilt from the
/// `Host` header and `X-Forwarded-Proto` (for TLS-terminating proxies).
pub fn request_origin(headers: &HeaderMap, public_base_url: Option<&str>) -> String {
    if let Some(base) = public_base_url {
        return base.to_string();
    }

    let scheme = headers
        .get(FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|proto| matches!(*proto, "http" | "https"))
        .unwrap_or("http");

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| {
            debug!("Request has no Host header, using localhost");
            "localhost"
        });

    format!("{scheme}://{host}")
}
