//! Hand-written fakes for the crate's protocol traits.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

use super::fixtures::api_response;
use crate::errors::{CoastError, Result};
use crate::extraction::{Article, ArticleExtractor};
use crate::results::ApiResponse;
use crate::search::{SearchClient, SearchObserver, SearchRequest};
use crate::segments::WordSource;

/// A word source that returns the same words on every draw.
#[derive(Debug, Clone)]
pub struct FixedWordSource {
    words: Vec<String>,
    draws: usize,
}

impl FixedWordSource {
    /// Creates a source that always draws `words`.
    #[must_use]
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            draws: 0,
        }
    }

    /// Number of draws made.
    #[must_use]
    pub const fn draws(&self) -> usize {
        self.draws
    }
}

impl WordSource for FixedWordSource {
    fn draw(&mut self, count: usize) -> Vec<String> {
        self.draws += 1;
        self.words.iter().take(count).cloned().collect()
    }
}

/// A word source that returns scripted draws in order, then nothing.
#[derive(Debug, Clone, Default)]
pub struct SequenceWordSource {
    pending: VecDeque<Vec<String>>,
    draws: usize,
}

impl SequenceWordSource {
    /// Creates a source from a list of draws.
    #[must_use]
    pub fn new(draws: Vec<Vec<&str>>) -> Self {
        Self {
            pending: draws
                .into_iter()
                .map(|words| words.into_iter().map(str::to_string).collect())
                .collect(),
            draws: 0,
        }
    }

    /// Number of draws made.
    #[must_use]
    pub const fn draws(&self) -> usize {
        self.draws
    }
}

impl WordSource for SequenceWordSource {
    fn draw(&mut self, count: usize) -> Vec<String> {
        self.draws += 1;
        self.pending
            .pop_front()
            .map(|words| words.into_iter().take(count).collect())
            .unwrap_or_default()
    }
}

type Responder = Box<dyn Fn(&SearchRequest) -> Result<ApiResponse> + Send + Sync>;

/// A search client that answers from a closure and records every request.
pub struct ScriptedSearchClient {
    responder: Responder,
    requests: Mutex<Vec<SearchRequest>>,
}

impl ScriptedSearchClient {
    /// Creates a client answering with `responder`.
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&SearchRequest) -> Result<ApiResponse> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answers every request with one hit whose URL encodes segment and start.
    #[must_use]
    pub fn echo() -> Self {
        Self::new(|request| Ok(echo_response(request)))
    }

    /// Like [`echo`](Self::echo), but fails every request for one segment.
    #[must_use]
    pub fn failing_for_segment(segment_id: u32) -> Self {
        Self::new(move |request| {
            if request.segment_id == segment_id {
                Err(CoastError::Search(format!(
                    "scripted failure for segment {segment_id}"
                )))
            } else {
                Ok(echo_response(request))
            }
        })
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl std::fmt::Debug for ScriptedSearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedSearchClient")
            .field("requests", &self.call_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SearchClient for ScriptedSearchClient {
    async fn search(&self, request: &SearchRequest) -> Result<ApiResponse> {
        self.requests.lock().push(request.clone());
        (self.responder)(request)
    }
}

fn echo_response(request: &SearchRequest) -> ApiResponse {
    let link = format!(
        "https://example.com/{}/{}",
        request.segment_id, request.start
    );
    let title = format!("Result {} for segment {}", request.start, request.segment_id);
    api_response(&[(title.as_str(), link.as_str())], request.start)
}

/// Records which segments each observer callback saw.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    started: Mutex<Vec<u32>>,
    completed: Mutex<Vec<u32>>,
    errors: Mutex<Vec<u32>>,
}

impl RecordingObserver {
    /// Segments of started requests.
    #[must_use]
    pub fn started(&self) -> Vec<u32> {
        self.started.lock().clone()
    }

    /// Segments of completed requests.
    #[must_use]
    pub fn completed(&self) -> Vec<u32> {
        self.completed.lock().clone()
    }

    /// Segments of failed requests.
    #[must_use]
    pub fn errors(&self) -> Vec<u32> {
        self.errors.lock().clone()
    }
}

impl SearchObserver for RecordingObserver {
    fn on_request_start(&self, request: &SearchRequest) {
        self.started.lock().push(request.segment_id);
    }

    fn on_request_complete(&self, request: &SearchRequest, _duration_ms: f64, _items: usize) {
        self.completed.lock().push(request.segment_id);
    }

    fn on_request_error(&self, request: &SearchRequest, _error: &str) {
        self.errors.lock().push(request.segment_id);
    }
}

/// An extractor that returns a canned article, optionally failing some URLs.
#[derive(Debug, Default)]
pub struct FakeExtractor {
    fail_pattern: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeExtractor {
    /// Fails every URL containing `pattern`.
    #[must_use]
    pub fn failing_when_contains(pattern: impl Into<String>) -> Self {
        Self {
            fail_pattern: Some(pattern.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// URLs extracted so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ArticleExtractor for FakeExtractor {
    async fn extract(&self, url: &str) -> Result<Article> {
        self.calls.lock().push(url.to_string());
        if let Some(pattern) = &self.fail_pattern {
            if url.contains(pattern.as_str()) {
                return Err(CoastError::Search(format!("could not extract {url}")));
            }
        }
        Ok(Article::new(url, format!("Body of {url}")).with_title(format!("Title of {url}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_source_truncates_to_count() {
        let mut source = FixedWordSource::new(["a", "b", "c"]);
        assert_eq!(source.draw(2), vec!["a", "b"]);
        assert_eq!(source.draws(), 1);
    }

    #[test]
    fn test_sequence_source_runs_dry() {
        let mut source = SequenceWordSource::new(vec![vec!["a", "b", "c"]]);
        assert_eq!(source.draw(3).len(), 3);
        assert!(source.draw(3).is_empty());
        assert_eq!(source.draws(), 2);
    }

    #[tokio::test]
    async fn test_scripted_client_records_requests() {
        let client = ScriptedSearchClient::echo();
        let request = SearchRequest {
            segment_id: 6,
            query: "q".to_string(),
            api_key: "k".to_string(),
            search_engine_id: "cx".to_string(),
            start: 11,
            ..Default::default()
        };

        let response = client.search(&request).await.unwrap();

        assert_eq!(response.items[0].link, "https://example.com/6/11");
        assert_eq!(client.call_count(), 1);
        assert_eq!(client.requests()[0], request);
    }
}
