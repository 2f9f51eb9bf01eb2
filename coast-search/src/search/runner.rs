//! Executes bound segments against a search provider.
//!
//! Every segment is searched `number_of_runs` times, and each run walks the
//! provider's pages (`start = 1, 11, 21, ...`) until `number_of_results` are
//! covered. A failed page is reported to the observer and skipped; the run
//! carries on with the next request.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::protocols::{NoOpSearchObserver, SearchClient, SearchObserver, SearchRequest};
use super::sink::ResultSink;
use crate::binding::BoundSegment;
use crate::config::{RunConfig, RESULTS_PER_PAGE};
use crate::errors::Result;
use crate::observability::SpanTimer;
use crate::results::SegmentResult;

/// Outcome of one day's search run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Identifier of this run, for correlating log lines.
    pub run_id: Uuid,
    /// Study day.
    pub day: i64,
    /// Segments searched.
    pub segments: usize,
    /// Requests attempted.
    pub requests: usize,
    /// Requests that produced a stored result.
    pub succeeded: usize,
    /// Requests that failed.
    pub failed: usize,
    /// Results the sink reports for the day after the run.
    pub stored: usize,
    /// Results a complete run stores.
    pub expected: usize,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Wall time in milliseconds.
    pub duration_ms: f64,
}

impl RunSummary {
    /// Whether the sink holds as many results as a complete run produces.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.stored == self.expected
    }

    /// Converts to dictionary.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut dict = HashMap::new();
        dict.insert("run_id".to_string(), serde_json::json!(self.run_id.to_string()));
        dict.insert("day".to_string(), serde_json::json!(self.day));
        dict.insert("segments".to_string(), serde_json::json!(self.segments));
        dict.insert("requests".to_string(), serde_json::json!(self.requests));
        dict.insert("succeeded".to_string(), serde_json::json!(self.succeeded));
        dict.insert("failed".to_string(), serde_json::json!(self.failed));
        dict.insert("stored".to_string(), serde_json::json!(self.stored));
        dict.insert("expected".to_string(), serde_json::json!(self.expected));
        dict.insert("complete".to_string(), serde_json::json!(self.is_complete()));
        dict.insert("duration_ms".to_string(), serde_json::json!(self.duration_ms));
        dict
    }
}

/// Drives a [`SearchClient`] over a set of bound segments.
pub struct SearchRunner<C> {
    client: C,
    observer: Arc<dyn SearchObserver>,
    number_of_runs: u32,
    number_of_results: u32,
    request_delay: Duration,
}

impl<C: SearchClient> SearchRunner<C> {
    /// Creates a runner doing one run of one page per segment with no delay.
    #[must_use]
    pub fn new(client: C) -> Self {
        Self {
            client,
            observer: Arc::new(NoOpSearchObserver),
            number_of_runs: 1,
            number_of_results: RESULTS_PER_PAGE,
            request_delay: Duration::ZERO,
        }
    }

    /// Creates a runner using the config's run, result and delay settings.
    #[must_use]
    pub fn from_config(client: C, config: &RunConfig) -> Self {
        Self::new(client)
            .with_runs(config.number_of_runs, config.number_of_results)
            .with_request_delay(config.request_delay())
    }

    /// Sets the observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn SearchObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Sets runs per segment and results per run.
    #[must_use]
    pub fn with_runs(mut self, number_of_runs: u32, number_of_results: u32) -> Self {
        self.number_of_runs = number_of_runs;
        self.number_of_results = number_of_results;
        self
    }

    /// Sets the pause before each request.
    #[must_use]
    pub const fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// The underlying client.
    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Page start indices for one run.
    #[must_use]
    pub fn page_starts(&self) -> Vec<u32> {
        (0..self.number_of_results)
            .step_by(RESULTS_PER_PAGE as usize)
            .map(|offset| offset + 1)
            .collect()
    }

    /// Results a complete run over `segments` stores.
    #[must_use]
    pub fn expected_results(&self, segments: usize) -> usize {
        self.page_starts().len() * self.number_of_runs as usize * segments
    }

    /// Searches every page of every run for one segment, tagging each
    /// request with `run_id` and `day`.
    ///
    /// Failed pages are skipped, so at most `runs x pages` results come back.
    pub async fn search_segment(
        &self,
        run_id: Uuid,
        day: i64,
        bound: &BoundSegment,
    ) -> Vec<SegmentResult> {
        let mut results = Vec::new();
        for _ in 0..self.number_of_runs {
            for start in self.page_starts() {
                let request = SearchRequest::for_page(bound, start).with_run(run_id, day);
                if let Some(result) = self.search_page(bound, &request).await {
                    results.push(result);
                }
            }
        }
        results
    }

    /// Runs every segment and stores each result for `day`.
    ///
    /// A sink error aborts the run.
    pub async fn run(
        &self,
        day: i64,
        segments: &[BoundSegment],
        sink: &mut dyn ResultSink,
    ) -> Result<RunSummary> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let timer = SpanTimer::start("search_run");
        let pages = self.page_starts();

        tracing::info!(
            %run_id,
            day,
            segments = segments.len(),
            runs = self.number_of_runs,
            pages = pages.len(),
            "Starting search run"
        );

        let per_segment = pages.len() * self.number_of_runs as usize;
        let mut requests = 0;
        let mut succeeded = 0;
        for bound in segments {
            let results = self.search_segment(run_id, day, bound).await;
            requests += per_segment;
            succeeded += results.len();
            for result in &results {
                sink.store(day, result)?;
            }
        }

        let summary = RunSummary {
            run_id,
            day,
            segments: segments.len(),
            requests,
            succeeded,
            failed: requests - succeeded,
            stored: sink.stored(day),
            expected: self.expected_results(segments.len()),
            started_at,
            duration_ms: timer.finish(),
        };

        if summary.is_complete() {
            tracing::info!(%run_id, day, stored = summary.stored, "Search run complete");
        } else {
            tracing::warn!(
                %run_id,
                day,
                stored = summary.stored,
                expected = summary.expected,
                "Stored result count does not match expected count"
            );
        }

        Ok(summary)
    }

    async fn search_page(
        &self,
        bound: &BoundSegment,
        request: &SearchRequest,
    ) -> Option<SegmentResult> {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        self.observer.on_request_start(request);
        let timer = SpanTimer::start("search_request");

        match self.client.search(request).await {
            Ok(response) => {
                let duration_ms = timer.finish();
                self.observer
                    .on_request_complete(request, duration_ms, response.items.len());
                Some(SegmentResult::from_response(
                    bound,
                    self.number_of_results,
                    &response,
                ))
            }
            Err(e) => {
                self.observer.on_request_error(request, &e.to_string());
                None
            }
        }
    }
}

impl<C> std::fmt::Debug for SearchRunner<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchRunner")
            .field("number_of_runs", &self.number_of_runs)
            .field("number_of_results", &self.number_of_results)
            .field("request_delay", &self.request_delay)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Credential;
    use crate::errors::CoastError;
    use crate::search::protocols::MockSearchClient;
    use crate::search::sink::MemorySink;
    use crate::segments::Segment;
    use crate::testing::{api_response, RecordingObserver, ScriptedSearchClient};
    use pretty_assertions::assert_eq;

    fn bound(ids: &[u32]) -> Vec<BoundSegment> {
        let credential = Credential::new("google", "key", "cx");
        ids.iter()
            .map(|&id| BoundSegment::new(Segment::new(id, "logic", format!("q{id}")), &credential))
            .collect()
    }

    #[test]
    fn test_page_starts() {
        let runner = SearchRunner::new(ScriptedSearchClient::echo());
        assert_eq!(runner.page_starts(), vec![1]);

        let runner = runner.with_runs(1, 30);
        assert_eq!(runner.page_starts(), vec![1, 11, 21]);

        let runner = runner.with_runs(1, 25);
        assert_eq!(runner.page_starts(), vec![1, 11, 21]);
    }

    #[test]
    fn test_expected_results() {
        let runner = SearchRunner::new(ScriptedSearchClient::echo()).with_runs(2, 20);
        assert_eq!(runner.expected_results(9), 2 * 2 * 9);
    }

    #[tokio::test]
    async fn test_run_stores_every_page() {
        let runner = SearchRunner::new(ScriptedSearchClient::echo()).with_runs(2, 20);
        let mut sink = MemorySink::new();

        let summary = runner.run(5, &bound(&[0, 1, 2]), &mut sink).await.unwrap();

        assert_eq!(summary.requests, 12);
        assert_eq!(summary.succeeded, 12);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.stored, 12);
        assert!(summary.is_complete());

        let requests = runner.client().requests();
        let starts: Vec<(u32, u32)> = requests.iter().take(4).map(|r| (r.segment_id, r.start)).collect();
        assert_eq!(starts, vec![(0, 1), (0, 11), (0, 1), (0, 11)]);
        assert_eq!(sink.results(5)[0].number_of_results_specified, Some(20));
    }

    #[tokio::test]
    async fn test_run_tags_requests_with_run_and_engine() {
        let runner = SearchRunner::new(ScriptedSearchClient::echo());
        let mut sink = MemorySink::new();

        let summary = runner.run(7, &bound(&[0, 3]), &mut sink).await.unwrap();

        let requests = runner.client().requests();
        assert_eq!(requests.len(), 2);
        for request in &requests {
            assert_eq!(request.run_id, Some(summary.run_id));
            assert_eq!(request.day, Some(7));
            assert_eq!(request.engine, "google");
        }
        let attrs = requests[1].span_attributes().to_attributes();
        assert_eq!(attrs.get("search.run_id"), Some(&summary.run_id.to_string()));
        assert_eq!(attrs.get("search.engine"), Some(&"google".to_string()));
    }

    #[tokio::test]
    async fn test_failed_requests_are_skipped() {
        let client = ScriptedSearchClient::failing_for_segment(1);
        let observer = Arc::new(RecordingObserver::default());
        let runner = SearchRunner::new(client).with_observer(observer.clone());
        let mut sink = MemorySink::new();

        let summary = runner.run(1, &bound(&[0, 1, 2]), &mut sink).await.unwrap();

        assert_eq!(summary.requests, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.stored, 2);
        assert!(!summary.is_complete());
        assert_eq!(observer.errors(), vec![1]);
        assert_eq!(observer.completed(), vec![0, 2]);

        let ids: Vec<u32> = sink.results(1).iter().map(|r| r.segment_id).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[tokio::test]
    async fn test_search_segment_with_mock_client() {
        let mut client = MockSearchClient::new();
        client
            .expect_search()
            .times(2)
            .returning(|request| Ok(api_response(&[("A", "https://a")], request.start)));

        let runner = SearchRunner::new(client).with_runs(2, 10);
        let results = runner.search_segment(Uuid::nil(), 1, &bound(&[4])[0]).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].links, vec!["https://a"]);
        assert_eq!(results[1].query_string, "q4");
    }

    #[tokio::test]
    async fn test_search_segment_mock_error() {
        let mut client = MockSearchClient::new();
        client
            .expect_search()
            .returning(|_| Err(CoastError::Search("quota exceeded".to_string())));

        let runner = SearchRunner::new(client);
        assert!(runner
            .search_segment(Uuid::nil(), 1, &bound(&[2])[0])
            .await
            .is_empty());
    }

    #[test]
    fn test_summary_to_dict() {
        let summary = RunSummary {
            run_id: Uuid::nil(),
            day: 3,
            segments: 9,
            requests: 9,
            succeeded: 8,
            failed: 1,
            stored: 8,
            expected: 9,
            started_at: Utc::now(),
            duration_ms: 1.5,
        };
        let dict = summary.to_dict();
        assert_eq!(dict["complete"], serde_json::json!(false));
        assert_eq!(dict["expected"], serde_json::json!(9));
    }
}
