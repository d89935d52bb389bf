use tracing::{error, info};

/// Completes when SIGTERM or SIGINT (Ctrl+C) is received.
///
/// In-flight background deliveries are not awaited.
pub async fn shutdown_signal() {
    let interrupt = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(stage = "app", error = %err, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(stage = "app", error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {
            info!(stage = "app", "received SIGINT, shutting down");
        }
        _ = terminate => {
            info!(stage = "app", "received SIGTERM, shutting down");
        }
    }
}
