//! Protocol traits for search execution.
//!
//! These traits define the seams between the runner and the outside world:
//! the provider client and observability callbacks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::binding::BoundSegment;
use crate::errors::Result;
use crate::observability::RequestSpanAttributes;
use crate::results::ApiResponse;

/// One provider page request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Segment being searched.
    pub segment_id: u32,
    /// Query string.
    pub query: String,
    /// Provider API key.
    pub api_key: String,
    /// Custom search engine id.
    pub search_engine_id: String,
    /// 1-based index of the first result on the page.
    pub start: u32,
    /// Name of the engine the segment is bound to.
    #[serde(default)]
    pub engine: String,
    /// Run the request belongs to.
    #[serde(default)]
    pub run_id: Option<Uuid>,
    /// Study day of that run.
    #[serde(default)]
    pub day: Option<i64>,
}

impl SearchRequest {
    /// Builds the request for one page of a bound segment.
    #[must_use]
    pub fn for_page(bound: &BoundSegment, start: u32) -> Self {
        Self {
            segment_id: bound.segment_id(),
            query: bound.query().to_string(),
            api_key: bound.api_key.clone(),
            search_engine_id: bound.search_engine_id.clone(),
            start,
            engine: bound.se_name.clone(),
            run_id: None,
            day: None,
        }
    }

    /// Tags the request with its run.
    #[must_use]
    pub fn with_run(mut self, run_id: Uuid, day: i64) -> Self {
        self.run_id = Some(run_id);
        self.day = Some(day);
        self
    }

    /// Span attributes identifying this request.
    #[must_use]
    pub fn span_attributes(&self) -> RequestSpanAttributes {
        let mut attributes = RequestSpanAttributes::new(self.segment_id, self.start);
        if let (Some(run_id), Some(day)) = (self.run_id, self.day) {
            attributes = attributes.with_run(run_id.to_string(), day);
        }
        if !self.engine.is_empty() {
            attributes = attributes.with_engine(self.engine.as_str());
        }
        attributes
    }
}

/// Protocol for the search provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Executes one page request.
    async fn search(&self, request: &SearchRequest) -> Result<ApiResponse>;
}

/// Observability callbacks for search requests.
pub trait SearchObserver: Send + Sync {
    /// Called before a request is sent.
    fn on_request_start(&self, request: &SearchRequest);

    /// Called when a request succeeds.
    fn on_request_complete(&self, request: &SearchRequest, duration_ms: f64, items: usize);

    /// Called when a request fails.
    fn on_request_error(&self, request: &SearchRequest, error: &str);
}

/// No-op implementation of `SearchObserver`.
#[derive(Debug, Clone, Default)]
pub struct NoOpSearchObserver;

impl SearchObserver for NoOpSearchObserver {
    fn on_request_start(&self, _request: &SearchRequest) {}
    fn on_request_complete(&self, _request: &SearchRequest, _duration_ms: f64, _items: usize) {}
    fn on_request_error(&self, _request: &SearchRequest, _error: &str) {}
}

/// Logs request lifecycle events through `tracing`.
#[derive(Debug, Clone, Default)]
pub struct LoggingSearchObserver;

impl SearchObserver for LoggingSearchObserver {
    fn on_request_start(&self, request: &SearchRequest) {
        let attributes = request.span_attributes().to_attributes();
        tracing::debug!(?attributes, "Search request started");
    }

    fn on_request_complete(&self, request: &SearchRequest, duration_ms: f64, items: usize) {
        let attributes = request
            .span_attributes()
            .with_duration_ms(duration_ms)
            .to_attributes();
        tracing::info!(items, ?attributes, "Search request completed");
    }

    fn on_request_error(&self, request: &SearchRequest, error: &str) {
        let attributes = request.span_attributes().with_error(error).to_attributes();
        tracing::error!(?attributes, "Search request failed");
    }
}
