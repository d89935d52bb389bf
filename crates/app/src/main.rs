mod problem;
mod relay;
mod router;
mod shutdown;
mod telemetry;
mod webhook;

use std::net::SocketAddr;

use solscout_util::{load_env_file, AppConfig};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_env_file();
    let config = AppConfig::from_env()?;

    telemetry::init_tracing(&config)?;
    let metrics = telemetry::init_metrics()?;

    let http = reqwest::Client::builder().build()?;
    let relay = relay::Relay::from_config(&config, http)?;

    if !relay.telegram().is_configured() {
        warn!(
            stage = "app",
            "TELEGRAM_TOKEN or CHAT_ID is not set; deliveries will fail until configured"
        );
    }
    if config.webhook_auth.is_none() {
        warn!(stage = "app", "HELIUS_AUTH is not set; webhook accepts unauthenticated requests");
    }
    if let Some(wallet) = relay.normalizer().watched_wallet() {
        info!(stage = "app", %wallet, "watching wallet for inbound transfers");
    }

    let state = router::AppState::new(metrics, config.webhook_auth.clone(), relay);

    let addr: SocketAddr = config.bind_addr;
    info!(stage = "app", %addr, env = %config.environment.as_str(), "starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router::app_router(state))
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await?;

    info!(stage = "app", "HTTP server stopped");
    Ok(())
}
