//! HTTP server startup logic.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum_server::Handle;

use crate::config::HttpServerConfig;

use super::shutdown;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid listen address '{0}'")]
    Address(String),

    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),
}

/// Start the HTTP server on the configured address.
///
/// This function blocks until the server has shut down gracefully.
pub async fn start_server(app: Router, config: &HttpServerConfig) -> Result<(), ServerError> {
    let addr = listen_addr(config)?;
    let handle = Handle::new();

    tracing::info!(%addr, "Starting HTTP server");

    shutdown::setup_shutdown_handler(
        handle.clone(),
        Duration::from_secs(config.shutdown_grace_seconds),
    );
    log_bound_address(handle.clone());

    axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn listen_addr(config: &HttpServerConfig) -> Result<SocketAddr, ServerError> {
    // Bracket bare IPv6 hosts so "::1" and 8080 form "[::1]:8080"
    let host = if config.host.contains(':') && !config.host.starts_with('[') {
        format!("[{}]", config.host)
    } else {
        config.host.clone()
    };
    let addr = format!("{}:{}", host, config.port);
    addr.parse().map_err(|_| ServerError::Address(addr))
}

/// Log the address actually bound, which differs from the configured one for port 0.
fn log_bound_address(handle: Handle) {
    tokio::spawn(async move {
        if let Some(addr) = handle.listening().await {
            tracing::info!(%addr, "Listening");
        }
    });
}
