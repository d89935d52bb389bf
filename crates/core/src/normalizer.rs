use chrono::DateTime;
use serde_json::Value;

use crate::links::LinkBuilder;
use crate::types::{is_resolved, text_value, NormalizedEvent, RawEvent, SENTINEL};

const WALLET_KEYS: &[&str] = &["feePayer", "fee_payer"];
const TYPE_KEYS: &[&str] = &["transaction_type", "type"];
const SIGNATURE_KEYS: &[&str] = &["signature"];
const TITLE_KEYS: &[&str] = &["description"];
const TRANSFER_KEYS: &[&str] = &["tokenTransfers", "token_transfers"];

const TRANSFER_DESTINATION_KEYS: &[&str] = &["toUserAccount", "owner", "to"];
const TRANSFER_AMOUNT_KEYS: &[&str] = &["tokenAmount", "amount"];

pub const DEFAULT_TRANSACTION_TYPE: &str = "UNKNOWN";
pub const DEFAULT_TITLE: &str = "Solana transaction";

/// Deterministic normalizer turning raw webhook events into [`NormalizedEvent`] values.
///
/// Normalization is total: every lookup falls back to [`SENTINEL`] or a default.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    links: LinkBuilder,
    watched_wallet: Option<String>,
}

impl Normalizer {
    pub fn new(links: LinkBuilder, watched_wallet: Option<String>) -> Self {
        Self {
            links,
            watched_wallet: watched_wallet.filter(|wallet| is_resolved(wallet)),
        }
    }

    pub fn watched_wallet(&self) -> Option<&str> {
        self.watched_wallet.as_deref()
    }

    /// Converts a raw event into its canonical projection.
    pub fn normalize(&self, raw: &RawEvent) -> NormalizedEvent {
        let wallet_address = raw
            .first_text(WALLET_KEYS)
            .unwrap_or_else(|| SENTINEL.to_string());
        let transaction_type = raw
            .first_text(TYPE_KEYS)
            .unwrap_or_else(|| DEFAULT_TRANSACTION_TYPE.to_string());
        let signature = raw
            .first_text(SIGNATURE_KEYS)
            .unwrap_or_else(|| SENTINEL.to_string());
        let title = raw
            .first_text(TITLE_KEYS)
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        let watched = self
            .watched_wallet
            .as_deref()
            .or_else(|| is_resolved(&wallet_address).then_some(wallet_address.as_str()));
        let transfers = raw.first_array(TRANSFER_KEYS).unwrap_or_default();
        let selected = select_transfer(transfers, watched);

        let token_mint = selected
            .and_then(|transfer| transfer.get("mint"))
            .and_then(text_value)
            .unwrap_or_else(|| SENTINEL.to_string());
        let token_amount = selected
            .and_then(transfer_amount)
            .and_then(display_amount)
            .unwrap_or_else(|| SENTINEL.to_string());

        let timestamp_utc = raw
            .get("timestamp")
            .and_then(format_timestamp)
            .unwrap_or_else(|| SENTINEL.to_string());

        let links = self.links.build(&signature, &token_mint);

        NormalizedEvent {
            wallet_address,
            transaction_type,
            signature,
            token_mint,
            token_amount,
            timestamp_utc,
            title,
            links,
        }
    }
}

/// Picks the transfer shown in the notification.
///
/// The first strictly positive transfer into `watched` wins; otherwise the
/// first transfer in the list is used. An empty list selects nothing.
pub fn select_transfer<'a>(transfers: &'a [Value], watched: Option<&str>) -> Option<&'a Value> {
    let inbound = watched.and_then(|wallet| {
        transfers.iter().find(|transfer| {
            transfer_destination(transfer) == Some(wallet)
                && transfer_amount(transfer)
                    .and_then(numeric_amount)
                    .is_some_and(|amount| amount > 0.0)
        })
    });

    inbound.or_else(|| transfers.first())
}

fn transfer_destination(transfer: &Value) -> Option<&str> {
    TRANSFER_DESTINATION_KEYS
        .iter()
        .find_map(|key| transfer.get(key).and_then(Value::as_str))
}

fn transfer_amount(transfer: &Value) -> Option<&Value> {
    TRANSFER_AMOUNT_KEYS
        .iter()
        .find_map(|key| transfer.get(key).filter(|value| !is_blank(value)))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

fn numeric_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn display_amount(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Renders a seconds-based timestamp as `YYYY-MM-DD HH:MM:SS.mmm` (UTC).
///
/// Zero, non-numeric and out-of-range values yield `None`.
pub fn format_timestamp(value: &Value) -> Option<String> {
    let seconds = numeric_amount(value)?;
    let millis = (seconds * 1000.0).trunc();
    if !millis.is_finite() || millis == 0.0 || millis.abs() > i64::MAX as f64 {
        return None;
    }

    DateTime::from_timestamp_millis(millis as i64)
        .map(|instant| instant.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
}
