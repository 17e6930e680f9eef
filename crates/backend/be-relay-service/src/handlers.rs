use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header},
    response::{IntoResponse, Json, Response},
};
use tracing::{debug, instrument, warn};

use crate::{
    error::RelayError,
    routing::RelayRequest,
    service::AppState,
    types::{AssetId, UpdateCheck},
    utils::request_origin,
};

/// Single entry point for every request; see [`RelayRequest`] for the routes.
#[instrument(skip_all, fields(method = %method, path = %uri.path()))]
pub async fn relay_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    match RelayRequest::classify(&method, uri.path()) {
        RelayRequest::Preflight => StatusCode::NO_CONTENT.into_response(),
        RelayRequest::Download {
            asset_id,
            file_name,
        } => download_handler(&state, &asset_id, &file_name).await,
        RelayRequest::CheckUpdate(check) => check_update_handler(&state, &check, &headers).await,
        RelayRequest::Malformed(reason) => RelayError::Malformed(reason).into_response(),
    }
}

#[instrument(skip(state, headers), fields(
    os = %check.target,
    arch = %check.arch,
    current_version = %check.current_version
))]
async fn check_update_handler(state: &AppState, check: &UpdateCheck, headers: &HeaderMap) -> Response {
    let origin = request_origin(headers, state.public_base_url());

    match state.check_for_update(check, &origin).await {
        Ok(Some(update)) => {
            debug!("Update available: version {}", update.version);
            (StatusCode::OK, Json(update)).into_response()
        }
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            warn!("Update check failed: {}", e);
            e.into_response()
        }
    }
}

#[instrument(skip(state))]
async fn download_handler(state: &AppState, asset_id: &AssetId, file_name: &str) -> Response {
    let disposition = match HeaderValue::from_bytes(
        format!("attachment; filename=\"{file_name}\"").as_bytes(),
    ) {
        Ok(value) => value,
        Err(_) => {
            return RelayError::Malformed(format!("invalid asset name '{file_name}'"))
                .into_response();
        }
    };

    match state.download_asset(asset_id).await {
        Ok(asset) => {
            debug!(content_length = ?asset.content_length, "Relaying asset {}", asset_id);
            let mut response = Response::new(Body::from_stream(asset.stream));
            let response_headers = response.headers_mut();
            response_headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            );
            response_headers.insert(header::CONTENT_DISPOSITION, disposition);
            if let Some(length) = asset.content_length {
                response_headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
            }
            response
        }
        Err(e) => {
            warn!("Asset download failed: {}", e);
            e.into_response()
        }
    }
}
