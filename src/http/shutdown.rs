//! Graceful shutdown on SIGTERM and SIGINT.

use std::time::Duration;

use axum_server::Handle;

/// Setup graceful shutdown on SIGTERM and SIGINT.
///
/// When either signal is received, the server stops accepting connections and
/// waits up to `grace` for in-flight requests before shutting down. On unix the
/// handlers are installed before this returns, so a signal sent once the port
/// accepts connections is never handled by the default action.
pub fn setup_shutdown_handler(handle: Handle, grace: Duration) {
    #[cfg(unix)]
    let signals = {
        use tokio::signal::unix::{signal, SignalKind};
        (signal(SignalKind::interrupt()), signal(SignalKind::terminate()))
    };

    tokio::spawn(async move {
        #[cfg(unix)]
        let (ctrl_c, terminate) = {
            let (interrupt, terminate) = signals;
            (
                async move {
                    match interrupt {
                        Ok(mut sigint) => {
                            sigint.recv().await;
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to install SIGINT handler");
                            std::future::pending::<()>().await;
                        }
                    }
                },
                async move {
                    match terminate {
                        Ok(mut sigterm) => {
                            sigterm.recv().await;
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to install SIGTERM handler");
                            std::future::pending::<()>().await;
                        }
                    }
                },
            )
        };

        #[cfg(not(unix))]
        let (ctrl_c, terminate) = (
            async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                    std::future::pending::<()>().await;
                }
            },
            std::future::pending::<()>(),
        );

        tokio::select! {
            _ = ctrl_c => {
                tracing::info!("Received Ctrl+C, initiating graceful shutdown");
            }
            _ = terminate => {
                tracing::info!("Received SIGTERM, initiating graceful shutdown");
            }
        }

        handle.graceful_shutdown(Some(grace));
        tracing::info!(
            grace_seconds = grace.as_secs(),
            "Graceful shutdown initiated, waiting for connections to close"
        );
    });
}
