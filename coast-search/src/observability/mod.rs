//! Observability utilities.

mod spans;
mod subscriber;
mod wide_events;

pub use spans::{RequestSpanAttributes, SpanTimer};
pub use subscriber::{init_tracing, LogFormat, DEFAULT_FILTER};
pub use wide_events::WideEventEmitter;
