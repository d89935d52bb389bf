use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::{SecondsFormat, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::{error, info};

use crate::problem::ProblemResponse;
use crate::relay::Relay;
use crate::{telemetry, webhook};

/// Upper bound for webhook bodies.
pub const WEBHOOK_BODY_LIMIT: usize = 2 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    metrics: PrometheusHandle,
    webhook_auth: Option<Arc<str>>,
    relay: Arc<Relay>,
}

impl AppState {
    pub fn new(metrics: PrometheusHandle, webhook_auth: Option<String>, relay: Relay) -> Self {
        Self {
            metrics,
            webhook_auth: webhook_auth.map(Arc::from),
            relay: Arc::new(relay),
        }
    }

    pub fn metrics(&self) -> &PrometheusHandle {
        &self.metrics
    }

    /// Shared secret expected in the `Authorization` header, if any.
    pub fn webhook_auth(&self) -> Option<&str> {
        self.webhook_auth.as_deref()
    }

    pub fn relay(&self) -> Arc<Relay> {
        self.relay.clone()
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .route("/test/telegram", get(telegram_smoke_test))
        .route("/helius", post(webhook::handle))
        .layer(DefaultBodyLimit::max(WEBHOOK_BODY_LIMIT))
        .with_state(state)
}

async fn root() -> &'static str {
    "ok"
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = telemetry::render_metrics(state.metrics());
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
}

/// Sends a timestamped probe message and echoes Telegram's response.
async fn telegram_smoke_test(State(state): State<AppState>) -> Result<String, ProblemResponse> {
    let text = format!(
        "✅ Test @ {}",
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    );

    match state.relay().telegram().send_message(&text).await {
        Ok(confirmation) => {
            info!(stage = "delivery", "telegram smoke test delivered");
            Ok(confirmation)
        }
        Err(err) => {
            error!(stage = "delivery", error = %err, "telegram smoke test failed");
            Err(ProblemResponse::new(
                StatusCode::BAD_GATEWAY,
                "delivery_failed",
                err.to_string(),
            ))
        }
    }
}
