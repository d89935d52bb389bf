use std::fmt;

use serde_json::{Map, Value};

/// Placeholder used for every field that could not be resolved from the payload.
pub const SENTINEL: &str = "-";

/// Returns `true` when the value carries real data rather than [`SENTINEL`].
pub fn is_resolved(value: &str) -> bool {
    !value.is_empty() && value != SENTINEL
}

/// One untyped event object as delivered by the webhook sender.
///
/// Field names differ between provider versions, so lookups go through
/// [`RawEvent::first_text`] which accepts a list of aliases.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawEvent(Map<String, Value>);

impl RawEvent {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the first alias holding a non-empty string or a number, rendered as text.
    pub fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.get(key).and_then(text_value))
    }

    /// Returns the first alias holding an array.
    pub fn first_array(&self, keys: &[&str]) -> Option<&[Value]> {
        keys.iter()
            .find_map(|key| self.get(key).and_then(Value::as_array))
            .map(Vec::as_slice)
    }

    /// Signature for log lines; never fails.
    pub fn signature_hint(&self) -> &str {
        self.get("signature")
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
            .unwrap_or(SENTINEL)
    }
}

/// Renders scalar JSON values the way they appear in notifications.
///
/// Empty strings, `null`, booleans and containers are treated as missing.
pub fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// External reference attached to a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub label: String,
    pub url: String,
}

impl Link {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

/// Canonical projection of a raw webhook event.
///
/// Every field always holds a value; unresolvable data is [`SENTINEL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEvent {
    pub wallet_address: String,
    pub transaction_type: String,
    pub signature: String,
    pub token_mint: String,
    pub token_amount: String,
    pub timestamp_utc: String,
    pub title: String,
    pub links: Vec<Link>,
}

impl fmt::Display for NormalizedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({} {})",
            self.transaction_type, self.signature, self.token_amount, self.token_mint
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawEvent {
        match value {
            Value::Object(map) => RawEvent::new(map),
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn first_text_skips_empty_and_non_scalar_aliases() {
        let event = raw(json!({
            "feePayer": "",
            "fee_payer": "Payer1",
            "type": {"nested": true},
            "transaction_type": 7
        }));

        assert_eq!(
            event.first_text(&["feePayer", "fee_payer"]).as_deref(),
            Some("Payer1")
        );
        assert_eq!(
            event.first_text(&["type", "transaction_type"]).as_deref(),
            Some("7")
        );
        assert_eq!(event.first_text(&["missing"]), None);
    }

    #[test]
    fn signature_hint_falls_back_to_sentinel() {
        assert_eq!(raw(json!({"signature": "abc"})).signature_hint(), "abc");
        assert_eq!(raw(json!({"signature": 5})).signature_hint(), SENTINEL);
        assert_eq!(RawEvent::default().signature_hint(), SENTINEL);
    }

    #[test]
    fn sentinel_is_not_resolved() {
        assert!(!is_resolved(SENTINEL));
        assert!(!is_resolved(""));
        assert!(is_resolved("Mint1"));
    }
}
