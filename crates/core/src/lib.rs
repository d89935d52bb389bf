//! Domain layer for the webhook relay: envelope unwrapping, normalization,
//! link building and notification rendering. Everything here is pure; I/O
//! lives in the app and telegram crates.

pub mod envelope;
pub mod links;
pub mod normalizer;
pub mod render;
pub mod types;

pub use envelope::{extract_events, Envelope, EnvelopeError, Extracted};
pub use links::{LinkBuilder, LinkTemplate};
pub use normalizer::Normalizer;
pub use render::render;
pub use types::{Link, NormalizedEvent, RawEvent, SENTINEL};
