use be_relay_service::{RelayConfig, init_relay_service};
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Configuration for running the relay server.
pub struct ServerConfig {
    pub relay: RelayConfig,
    /// When this receiver gets a value, the server shuts down gracefully.
    pub shutdown: tokio::sync::watch::Receiver<()>,
}

pub async fn run_server(
    config: ServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let http_addr = config.relay.http_addr;

    let listener = TcpListener::bind(http_addr).await?;
    tracing::info!("Starting HTTP server at {}", listener.local_addr()?);

    serve(listener, config.relay, config.shutdown).await
}

/// Serve the relay on an already bound listener until `shutdown` fires.
pub async fn serve(
    listener: TcpListener,
    relay: RelayConfig,
    mut shutdown: tokio::sync::watch::Receiver<()>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let router = match init_relay_service(relay) {
        Ok(router) => router,
        Err(e) => {
            tracing::error!("Failed to initialize relay service: {}", e);
            return Err(e.into());
        }
    };

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let _ = shutdown.changed().await;
        tracing::info!("Shutting down HTTP server...");
    })
    .await?;

    Ok(())
}
