//! Eurora Update Relay Service
//!
//! A Tauri-compatible update endpoint in front of a private GitHub repository.
//! Clients ask whether a newer release exists for their platform and download
//! the installer through the relay, so the repository token never leaves the
//! server.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    http::{HeaderValue, header},
};
use tower::ServiceBuilder;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::debug;

pub mod config;
pub mod error;
pub mod handlers;
pub mod host;
pub mod resolver;
pub mod routing;
pub mod service;
pub mod types;
pub mod utils;
pub mod version;

#[cfg(test)]
mod test_support;

use service::AppState;

/// Create the axum router.
///
/// Routing is done by [`routing::RelayRequest`], so everything goes to a
/// single fallback handler. The CORS headers are set on every response,
/// errors included.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(handlers::relay_handler)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_ORIGIN,
                    HeaderValue::from_static("*"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static("GET, OPTIONS"),
                )),
        )
        .with_state(state)
}

/// Initialize the relay service and return the router
pub fn init_relay_service(config: RelayConfig) -> Result<Router> {
    debug!(
        "Initializing relay service for {}/{}",
        config.upstream.repo_owner, config.upstream.repo_name
    );

    let state = Arc::new(
        AppState::from_config(config).context("Failed to create application state")?,
    );

    Ok(create_router(state))
}

// Re-export commonly used types
pub use config::{RelayConfig, UpstreamConfig};
pub use error::{ErrorResponse, RelayError};
pub use host::{AssetBytes, GitHubReleaseHost, ReleaseHost};
pub use routing::RelayRequest;
pub use types::{
    AssetId, Manifest, PlatformEntry, Release, ReleaseAsset, ResolvedAsset, UpdateCheck,
    UpdateResponse,
};
pub use version::VersionOrdering;
