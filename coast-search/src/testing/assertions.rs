//! Assertions for plans and dedup reports.

use crate::results::DedupReport;
use crate::search::RunSummary;
use crate::segments::Segment;

/// Asserts that segments carry exactly the given ids, in order.
pub fn assert_segment_ids(segments: &[Segment], expected: &[u32]) {
    let actual: Vec<u32> = segments.iter().map(|s| s.segment_id).collect();
    assert_eq!(
        actual, expected,
        "Expected segment ids {expected:?}, got {actual:?}"
    );
}

/// Asserts that the segment with `segment_id` has the given logic label.
pub fn assert_segment_logic(segments: &[Segment], segment_id: u32, logic: &str) {
    let segment = segments.iter().find(|s| s.segment_id == segment_id);
    assert!(
        segment.is_some(),
        "Expected a segment with id {segment_id}"
    );
    if let Some(segment) = segment {
        assert_eq!(
            segment.logic, logic,
            "Unexpected logic for segment {segment_id}"
        );
    }
}

/// Asserts that no URL was found by more than one item.
pub fn assert_no_collisions(report: &DedupReport) {
    assert!(
        report.warning.is_none(),
        "Expected no collisions, got {:?}",
        report.warning
    );
}

/// Asserts that `url` was reported as a collision.
pub fn assert_collision(report: &DedupReport, url: &str) {
    let urls = report.warning.as_ref().map(|w| w.urls.as_slice()).unwrap_or_default();
    assert!(
        urls.iter().any(|u| u == url),
        "Expected '{url}' to be reported as a collision. Collisions: {urls:?}"
    );
}

/// Asserts that the run stored as many results as expected.
pub fn assert_run_complete(summary: &RunSummary) {
    assert!(
        summary.is_complete(),
        "Expected {} stored results, got {} ({} failed requests)",
        summary.expected,
        summary.stored,
        summary.failed
    );
}
