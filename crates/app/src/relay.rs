use std::sync::Arc;

use metrics::counter;
use reqwest::Client;
use solscout_core::{render, LinkBuilder, Normalizer, RawEvent};
use solscout_telegram::{DeliveryError, TelegramClient};
use solscout_util::AppConfig;
use tracing::{debug, error, info};
use url::Url;

const CONFIRMATION_PREVIEW_CHARS: usize = 300;

/// Normalize, render and deliver pipeline shared by every request.
///
/// Immutable after construction; requests share it through an `Arc`.
#[derive(Clone)]
pub struct Relay {
    normalizer: Normalizer,
    telegram: TelegramClient,
}

/// Outcome of relaying one request's events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelaySummary {
    pub delivered: usize,
    pub failed: usize,
}

impl Relay {
    pub fn new(normalizer: Normalizer, telegram: TelegramClient) -> Self {
        Self {
            normalizer,
            telegram,
        }
    }

    /// Wires the pipeline from resolved configuration.
    pub fn from_config(config: &AppConfig, http: Client) -> Result<Self, url::ParseError> {
        let base_url = Url::parse(&config.telegram.api_base)?;
        let telegram = TelegramClient::new(
            config.telegram.bot_token.clone(),
            config.telegram.chat_id.clone(),
            base_url,
            http,
        );

        let links = LinkBuilder::new(config.links.explorer_tx.clone())
            .with_template("Swap", config.links.swap.as_deref())
            .with_template("Chart", config.links.analytics.as_deref())
            .with_template("Trade", config.links.trade.as_deref());
        let normalizer = Normalizer::new(links, config.watched_wallet.clone());

        Ok(Self::new(normalizer, telegram))
    }

    pub fn telegram(&self) -> &TelegramClient {
        &self.telegram
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Runs one event through normalize, render and deliver.
    pub async fn relay_event(&self, raw: &RawEvent) -> Result<String, DeliveryError> {
        let normalized = self.normalizer.normalize(raw);
        debug!(
            stage = "normalizer",
            signature = %normalized.signature,
            event = %normalized,
            links = normalized.links.len(),
            "event normalized"
        );

        let text = render(&normalized);
        self.telegram.send_message(&text).await
    }

    /// Relays events strictly in order.
    ///
    /// Each event runs as its own task and is awaited before the next one
    /// starts, so a delivery error or panic only affects that event.
    pub async fn relay_all(self: Arc<Self>, events: Vec<RawEvent>) -> RelaySummary {
        let mut summary = RelaySummary::default();
        let total = events.len();

        for (index, raw) in events.into_iter().enumerate() {
            let signature = raw.signature_hint().to_string();
            info!(stage = "delivery", %signature, position = index + 1, total, "processing event");

            let relay = Arc::clone(&self);
            let outcome = tokio::spawn(async move { relay.relay_event(&raw).await }).await;

            match outcome {
                Ok(Ok(confirmation)) => {
                    summary.delivered += 1;
                    counter!("telegram_deliveries_total", "result" => "ok").increment(1);
                    info!(
                        stage = "delivery",
                        %signature,
                        confirmation = preview(&confirmation, CONFIRMATION_PREVIEW_CHARS),
                        "telegram delivery succeeded"
                    );
                }
                Ok(Err(err)) => {
                    summary.failed += 1;
                    counter!("telegram_deliveries_total", "result" => err.metric_label())
                        .increment(1);
                    error!(stage = "delivery", %signature, error = %err, "telegram delivery failed");
                }
                Err(join_err) => {
                    summary.failed += 1;
                    counter!("telegram_deliveries_total", "result" => "panic").increment(1);
                    error!(stage = "delivery", %signature, error = %join_err, "event pipeline aborted");
                }
            }
        }

        summary
    }
}

/// Returns at most `limit` characters of `text`, cut on a char boundary.
pub fn preview(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
