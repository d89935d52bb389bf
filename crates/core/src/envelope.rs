use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::RawEvent;

/// Errors raised while unwrapping a webhook body.
///
/// Callers treat both variants as "no events"; they exist so the reason can be logged.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("failed to parse payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unrecognized payload shape: {0}")]
    UnrecognizedShape(&'static str),
}

/// Body shapes accepted on the webhook endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// `[event, event, ...]`
    Batch(Vec<Value>),
    /// `{ "data": [event, event, ...] }`
    Wrapped { data: Vec<Value> },
    /// `{ ...event fields... }`
    Single(Map<String, Value>),
}

/// Events recovered from an envelope.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Extracted {
    pub events: Vec<RawEvent>,
    /// Entries that were not JSON objects and were dropped.
    pub discarded: usize,
}

impl Envelope {
    /// Parses a request body.
    pub fn parse(body: &[u8]) -> Result<Self, EnvelopeError> {
        let value: Value = serde_json::from_slice(body)?;
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Self, EnvelopeError> {
        match value {
            Value::Array(items) => Ok(Self::Batch(items)),
            Value::Object(mut fields) => match fields.remove("data") {
                Some(Value::Array(items)) => Ok(Self::Wrapped { data: items }),
                Some(other) => {
                    fields.insert("data".to_string(), other);
                    Ok(Self::Single(fields))
                }
                None => Ok(Self::Single(fields)),
            },
            Value::Null => Err(EnvelopeError::UnrecognizedShape("null")),
            Value::Bool(_) => Err(EnvelopeError::UnrecognizedShape("boolean")),
            Value::Number(_) => Err(EnvelopeError::UnrecognizedShape("number")),
            Value::String(_) => Err(EnvelopeError::UnrecognizedShape("string")),
        }
    }

    /// Flattens the envelope into raw events, preserving order.
    pub fn into_events(self) -> Extracted {
        let items = match self {
            Self::Batch(items) | Self::Wrapped { data: items } => items,
            Self::Single(fields) if fields.is_empty() => Vec::new(),
            Self::Single(fields) => {
                return Extracted {
                    events: vec![RawEvent::new(fields)],
                    discarded: 0,
                }
            }
        };

        let mut extracted = Extracted::default();
        for item in items {
            match item {
                Value::Object(fields) => extracted.events.push(RawEvent::new(fields)),
                _ => extracted.discarded += 1,
            }
        }
        extracted
    }
}

/// Parses a body straight into raw events.
pub fn extract_events(body: &[u8]) -> Result<Extracted, EnvelopeError> {
    Envelope::parse(body).map(Envelope::into_events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event() -> Value {
        json!({
            "signature": "sig-1",
            "feePayer": "Payer1",
            "type": "SWAP",
            "timestamp": 1_700_000_000
        })
    }

    #[test]
    fn all_three_shapes_yield_the_same_events() {
        let batch = json!([event()]).to_string();
        let wrapped = json!({ "data": [event()] }).to_string();
        let single = event().to_string();

        let from_batch = extract_events(batch.as_bytes()).expect("batch");
        let from_wrapped = extract_events(wrapped.as_bytes()).expect("wrapped");
        let from_single = extract_events(single.as_bytes()).expect("single");

        assert_eq!(from_batch.events.len(), 1);
        assert_eq!(from_batch, from_wrapped);
        assert_eq!(from_batch, from_single);
    }

    #[test]
    fn batch_order_is_preserved_and_non_objects_are_discarded() {
        let body = json!([
            {"signature": "a"},
            "noise",
            42,
            {"signature": "b"}
        ])
        .to_string();

        let extracted = extract_events(body.as_bytes()).expect("batch");
        let signatures: Vec<_> = extracted
            .events
            .iter()
            .map(RawEvent::signature_hint)
            .collect();
        assert_eq!(signatures, vec!["a", "b"]);
        assert_eq!(extracted.discarded, 2);
    }

    #[test]
    fn empty_bodies_yield_no_events() {
        assert!(extract_events(b"[]").expect("list").events.is_empty());
        assert!(extract_events(b"{}").expect("object").events.is_empty());
        assert!(extract_events(br#"{"data": []}"#)
            .expect("wrapped")
            .events
            .is_empty());
    }

    #[test]
    fn non_array_data_field_is_part_of_a_single_event() {
        let body = json!({ "signature": "s", "data": "opaque" }).to_string();
        let extracted = extract_events(body.as_bytes()).expect("single");
        assert_eq!(extracted.events.len(), 1);
        assert_eq!(
            extracted.events[0].get("data"),
            Some(&Value::String("opaque".to_string()))
        );
    }

    #[test]
    fn scalars_and_invalid_json_are_rejected() {
        assert!(matches!(
            extract_events(b"\"hello\""),
            Err(EnvelopeError::UnrecognizedShape("string"))
        ));
        assert!(matches!(
            extract_events(b"null"),
            Err(EnvelopeError::UnrecognizedShape("null"))
        ));
        assert!(matches!(extract_events(b"{not json"), Err(EnvelopeError::Json(_))));
        assert!(matches!(extract_events(b""), Err(EnvelopeError::Json(_))));
    }
}
