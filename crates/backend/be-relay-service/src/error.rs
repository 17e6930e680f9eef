use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::{error, warn};

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Invalid request format: {0}")]
    Malformed(String),

    #[error("No manifest entry for platform '{platform_key}'")]
    PlatformNotSupported {
        platform_key: String,
        /// `"{target}/{arch}"` as requested by the client
        platform: String,
    },

    #[error("Asset '{asset_name}' referenced for platform '{platform_key}' is not part of the release")]
    AssetNotFound {
        platform_key: String,
        platform: String,
        asset_name: String,
    },

    #[error("Release has no latest.json manifest")]
    ManifestMissing,

    #[error("{message}")]
    Upstream { status: Option<u16>, message: String },

    #[error("Unexpected upstream payload: {0}")]
    InvalidUpstreamPayload(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Malformed(_) => StatusCode::BAD_REQUEST,
            RelayError::PlatformNotSupported { .. }
            | RelayError::AssetNotFound { .. }
            | RelayError::ManifestMissing => StatusCode::NOT_FOUND,
            RelayError::Upstream { .. }
            | RelayError::InvalidUpstreamPayload(_)
            | RelayError::Config(_)
            | RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            RelayError::Malformed(reason) => {
                warn!("Rejected malformed request: {}", reason);
                (
                    status,
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    self.to_string(),
                )
                    .into_response()
            }
            RelayError::PlatformNotSupported { platform, .. }
            | RelayError::AssetNotFound { platform, .. } => {
                warn!("Update resolution failed: {}", self);
                (
                    status,
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    format!("No suitable asset found for {platform}"),
                )
                    .into_response()
            }
            RelayError::ManifestMissing => {
                warn!("Update resolution failed: {}", self);
                (
                    status,
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    self.to_string(),
                )
                    .into_response()
            }
            RelayError::Upstream { status: upstream, .. } => {
                error!(upstream_status = ?upstream, "Upstream request failed: {}", self);
                (
                    status,
                    Json(ErrorResponse {
                        error: self.to_string(),
                    }),
                )
                    .into_response()
            }
            RelayError::InvalidUpstreamPayload(_)
            | RelayError::Config(_)
            | RelayError::Internal(_) => {
                error!("Relay error: {}", self);
                (
                    status,
                    Json(ErrorResponse {
                        error: self.to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}
