//! Wide event emitter for daily runs and dedup passes.
//!
//! A wide event is one JSON payload carrying everything known about a unit of
//! work. Payloads are logged at `info` under the `coast_search::wide_events`
//! target.

use std::collections::BTreeMap;

use crate::results::DedupReport;
use crate::search::DailyReport;

/// Emitter for wide events.
pub struct WideEventEmitter {
    /// Event type for daily runs.
    pub run_event_type: String,
    /// Event type for dedup passes.
    pub dedup_event_type: String,
}

impl Default for WideEventEmitter {
    fn default() -> Self {
        Self {
            run_event_type: "search.run.wide".to_string(),
            dedup_event_type: "search.dedup.wide".to_string(),
        }
    }
}

impl WideEventEmitter {
    /// Creates a new wide event emitter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a daily run payload.
    #[must_use]
    pub fn build_run_payload(report: &DailyReport) -> serde_json::Value {
        let summary = &report.summary;
        let status = if summary.is_complete() {
            "completed"
        } else {
            "incomplete"
        };

        let segment_logic: BTreeMap<u32, &str> = report
            .plan
            .segments
            .iter()
            .map(|s| (s.segment_id, s.logic.as_str()))
            .collect();

        serde_json::json!({
            "run_id": summary.run_id.to_string(),
            "day": report.day,
            "status": status,
            "started_at": summary.started_at.to_rfc3339(),
            "duration_ms": summary.duration_ms,
            "fingerprint": report.plan.fingerprint(),
            "seed": report.plan.seed,
            "random_phrase": report.plan.random_phrase,
            "total_words": report.plan.total_words,
            "segments": segment_logic,
            "requests": summary.requests,
            "failed": summary.failed,
            "stored": summary.stored,
            "expected": summary.expected,
        })
    }

    /// Builds a dedup payload.
    #[must_use]
    pub fn build_dedup_payload(day: i64, report: &DedupReport) -> serde_json::Value {
        let mut payload = serde_json::json!({
            "day": day,
            "urls": report.deduplicated_urls.len(),
            "unique_urls": report.unique_urls().len(),
            "collisions": report.warning.as_ref().map_or(0, |w| w.urls.len()),
        });

        if let Some(warning) = &report.warning {
            if let serde_json::Value::Object(ref mut map) = payload {
                let mut segments = warning.segments.clone();
                segments.sort_unstable();
                segments.dedup();
                map.insert("colliding_segments".to_string(), serde_json::json!(segments));
            }
        }

        payload
    }

    /// Emits a daily run wide event.
    pub fn emit_run_event(&self, report: &DailyReport) {
        let payload = Self::build_run_payload(report);
        tracing::info!(
            target: "coast_search::wide_events",
            event_type = %self.run_event_type,
            payload = %payload,
            "Wide event"
        );
    }

    /// Emits a dedup wide event.
    pub fn emit_dedup_event(&self, day: i64, report: &DedupReport) {
        let payload = Self::build_dedup_payload(day, report);
        tracing::info!(
            target: "coast_search::wide_events",
            event_type = %self.dedup_event_type,
            payload = %payload,
            "Wide event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{deduplicate, LinkCollection, LinkItem};
    use crate::search::RunSummary;
    use crate::segments::QueryPlanner;
    use crate::testing::three_dimensions;
    use chrono::Utc;
    use uuid::Uuid;

    fn report(stored: usize) -> DailyReport {
        let plan = QueryPlanner::new()
            .plan_with_phrase(&three_dimensions(), "annexs mug regions")
            .unwrap();
        DailyReport {
            day: 2,
            summary: RunSummary {
                run_id: Uuid::new_v4(),
                day: 2,
                segments: plan.len(),
                requests: 9,
                succeeded: stored,
                failed: 9 - stored,
                stored,
                expected: 9,
                started_at: Utc::now(),
                duration_ms: 40.0,
            },
            plan,
        }
    }

    #[test]
    fn test_emitter_creation() {
        let emitter = WideEventEmitter::new();
        assert_eq!(emitter.run_event_type, "search.run.wide");
        assert_eq!(emitter.dedup_event_type, "search.dedup.wide");
    }

    #[test]
    fn test_build_run_payload() {
        let payload = WideEventEmitter::build_run_payload(&report(9));

        assert_eq!(payload["status"], "completed");
        assert_eq!(payload["day"], 2);
        assert_eq!(payload["total_words"], 12);
        assert_eq!(payload["segments"]["2"], "topic + reasoning + experience");
        assert_eq!(payload["fingerprint"].as_str().unwrap().len(), 64);
    }

    #[test]
    fn test_incomplete_run_status() {
        let payload = WideEventEmitter::build_run_payload(&report(7));
        assert_eq!(payload["status"], "incomplete");
        assert_eq!(payload["failed"], 2);
    }

    #[test]
    fn test_build_dedup_payload() {
        let dedup = deduplicate(&LinkCollection {
            results: vec![vec![
                LinkItem::new(5, ["https://a", "https://b"]),
                LinkItem::new(2, ["https://a"]),
                LinkItem::new(5, ["https://b"]),
            ]],
        });

        let payload = WideEventEmitter::build_dedup_payload(4, &dedup);

        assert_eq!(payload["urls"], 4);
        assert_eq!(payload["unique_urls"], 2);
        assert_eq!(payload["collisions"], 2);
        assert_eq!(payload["colliding_segments"], serde_json::json!([2, 5]));
    }

    #[test]
    fn test_emit_does_not_panic() {
        let emitter = WideEventEmitter::new();
        emitter.emit_run_event(&report(9));
        emitter.emit_dedup_event(1, &DedupReport::default());
    }
}
