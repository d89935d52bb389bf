use std::{sync::Arc, time::Instant};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use metrics::{counter, histogram};
use solscout_core::{extract_events, Extracted, RawEvent};
use subtle::ConstantTimeEq;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::problem::ProblemResponse;
use crate::relay::{preview, Relay, RelaySummary};
use crate::router::AppState;

const BODY_PREVIEW_CHARS: usize = 4000;

/// Webhook endpoint: authenticate, acknowledge, then relay in the background.
///
/// The `200 OK` is produced before the body is even parsed; everything after
/// that runs on a detached task and cannot change the response. The task is
/// spawned before this handler returns, so on the multi-threaded runtime it may
/// start normalizing while the response bytes are still being written. Only
/// the response's content and latency are independent of delivery.
pub async fn handle(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ProblemResponse> {
    let start = Instant::now();

    if let Some(expected) = state.webhook_auth() {
        if let Err(reason) = verify_authorization(expected.as_bytes(), &headers) {
            let problem = ProblemResponse::unauthorized(reason);
            warn!(stage = "ingress", reason, status = %problem.status(), "rejected webhook request");
            counter!("webhook_requests_total", "result" => "unauthorized").increment(1);
            histogram!("webhook_ack_latency_seconds").record(start.elapsed().as_secs_f64());
            return Err(problem);
        }
    }

    counter!("webhook_requests_total", "result" => "accepted").increment(1);
    debug!(
        stage = "ingress",
        size_bytes = body.len(),
        body = %preview(&String::from_utf8_lossy(&body), BODY_PREVIEW_CHARS),
        "webhook body received"
    );

    spawn_relay(state.relay(), body);

    histogram!("webhook_ack_latency_seconds").record(start.elapsed().as_secs_f64());
    Ok((StatusCode::OK, "OK").into_response())
}

/// Compares the `Authorization` header with the configured secret in constant time.
fn verify_authorization(expected: &[u8], headers: &HeaderMap) -> Result<(), &'static str> {
    let provided = headers
        .get(header::AUTHORIZATION)
        .ok_or("missing authorization header")?;

    if expected.ct_eq(provided.as_bytes()).into() {
        Ok(())
    } else {
        Err("authorization header mismatch")
    }
}

/// Detached background work for one accepted request.
pub fn spawn_relay(relay: Arc<Relay>, body: Bytes) -> JoinHandle<RelaySummary> {
    tokio::spawn(async move {
        let events = unwrap_body(&body);
        if events.is_empty() {
            return RelaySummary::default();
        }

        let summary = relay.relay_all(events).await;
        info!(
            stage = "ingress",
            delivered = summary.delivered,
            failed = summary.failed,
            "webhook batch processed"
        );
        summary
    })
}

fn unwrap_body(body: &[u8]) -> Vec<RawEvent> {
    match extract_events(body) {
        Ok(Extracted { events, discarded }) => {
            if discarded > 0 {
                warn!(stage = "ingress", discarded, "dropped non-object entries from payload");
            }
            if events.is_empty() {
                warn!(stage = "ingress", "no events in payload");
                counter!("webhook_empty_payloads_total").increment(1);
            } else {
                counter!("webhook_events_total").increment(events.len() as u64);
            }
            events
        }
        Err(err) => {
            warn!(stage = "ingress", error = %err, "malformed payload treated as empty");
            counter!("webhook_empty_payloads_total").increment(1);
            Vec::new()
        }
    }
}
