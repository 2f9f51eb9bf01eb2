//! Span attributes and timing for search runs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

/// Attributes describing one request of a search run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestSpanAttributes {
    /// Run identifier.
    pub run_id: Option<String>,
    /// Study day.
    pub day: Option<i64>,
    /// Segment searched.
    pub segment_id: u32,
    /// 1-based page start.
    pub start: u32,
    /// Engine name.
    pub engine: Option<String>,
    /// Duration in milliseconds.
    pub duration_ms: Option<f64>,
    /// Error message if failed.
    pub error: Option<String>,
}

impl RequestSpanAttributes {
    /// Creates attributes for one page of a segment.
    #[must_use]
    pub fn new(segment_id: u32, start: u32) -> Self {
        Self {
            segment_id,
            start,
            ..Default::default()
        }
    }

    /// Sets the run identifier and day.
    #[must_use]
    pub fn with_run(mut self, run_id: impl Into<String>, day: i64) -> Self {
        self.run_id = Some(run_id.into());
        self.day = Some(day);
        self
    }

    /// Sets the engine name.
    #[must_use]
    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    /// Sets the duration.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Sets the error.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Flattens into dotted attribute names.
    #[must_use]
    pub fn to_attributes(&self) -> HashMap<String, String> {
        let mut attrs = HashMap::new();

        attrs.insert("search.segment_id".to_string(), self.segment_id.to_string());
        attrs.insert("search.start".to_string(), self.start.to_string());

        if let Some(ref v) = self.run_id {
            attrs.insert("search.run_id".to_string(), v.clone());
        }
        if let Some(v) = self.day {
            attrs.insert("search.day".to_string(), v.to_string());
        }
        if let Some(ref v) = self.engine {
            attrs.insert("search.engine".to_string(), v.clone());
        }
        if let Some(v) = self.duration_ms {
            attrs.insert("search.duration_ms".to_string(), v.to_string());
        }
        if let Some(ref v) = self.error {
            attrs.insert("search.error".to_string(), v.clone());
        }

        attrs
    }
}

/// Simple span timing helper.
#[derive(Debug)]
pub struct SpanTimer {
    start: Instant,
    name: String,
}

impl SpanTimer {
    /// Starts a new span timer.
    #[must_use]
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Returns the span name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Finishes the span, logs its duration and returns it.
    pub fn finish(self) -> f64 {
        let duration_ms = self.elapsed_ms();
        tracing::debug!(span_name = %self.name, duration_ms, "Span finished");
        duration_ms
    }
}
