//! End-to-end tests: plan, bind, search, deduplicate, extract.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;

use coast_search::binding::{merge, Credential};
use coast_search::extraction::ExtractionQueue;
use coast_search::prelude::*;
use coast_search::search::JsonFileSink;
use coast_search::segments::expected_segment_count;
use coast_search::testing::{
    assert_collision, assert_run_complete, assert_segment_ids, assert_segment_logic,
    three_dimensions, FakeExtractor, FixedWordSource, RecordingObserver, ScriptedSearchClient,
};

#[test]
fn single_dimension_example() {
    let dimensions = vec![Dimension::new("topic", ["credibility", "assessment"])];
    let plan = QueryPlanner::new()
        .plan_with_phrase(&dimensions, "annexs mug regions")
        .unwrap();

    let rows: Vec<(u32, &str, &str)> = plan
        .segments
        .iter()
        .map(|s| (s.segment_id, s.logic.as_str(), s.query.as_str()))
        .collect();

    assert_eq!(
        rows,
        vec![
            (
                0,
                "random + !(topic)",
                "\"annexs mug regions\" -\"credibility\" -\"assessment\" "
            ),
            (
                1,
                "seed + !(topic)",
                "\"software\" -\"credibility\" -\"assessment\" "
            ),
            (2, "topic", "(\"credibility\" OR \"assessment\")"),
        ]
    );
}

#[test]
fn three_dimension_partition() {
    let mut words = FixedWordSource::new(["annexs", "mug", "regions"]);
    let plan = plan_queries(&three_dimensions(), "software", 32, &mut words).unwrap();

    assert_eq!(Some(plan.len()), expected_segment_count(3));
    assert_segment_ids(&plan.segments, &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
    assert_segment_logic(&plan.segments, 2, "topic + reasoning + experience");
    assert_segment_logic(&plan.segments, 3, "topic + reasoning + !(experience)");
    assert_segment_logic(&plan.segments, 8, "experience + !(topic + reasoning)");

    let full = &plan.segments[2];
    assert!(!full.query.contains('-'));
    assert_eq!(full.query.matches(" AND ").count(), 2);

    for baseline in &plan.segments[..2] {
        assert!(!baseline.query.contains(" AND "));
    }
}

#[tokio::test]
async fn search_then_deduplicate_then_extract() {
    let mut words = FixedWordSource::new(["annexs", "mug", "regions"]);
    let plan = plan_queries(&three_dimensions(), "software", 32, &mut words).unwrap();
    let bound = merge(
        plan.segments.clone(),
        &[Credential::new("google", "key", "cx")],
    )
    .unwrap();

    // Segments 2 and 5 share a result.
    let client = ScriptedSearchClient::new(|request| {
        let own = format!("https://example.com/{}", request.segment_id);
        let hits: Vec<(&str, &str)> = if matches!(request.segment_id, 2 | 5) {
            vec![("Own", own.as_str()), ("Shared", "https://shared.example")]
        } else {
            vec![("Own", own.as_str())]
        };
        Ok(coast_search::testing::api_response(&hits, request.start))
    });
    let observer = Arc::new(RecordingObserver::default());
    let runner = SearchRunner::new(client).with_observer(observer.clone());

    let dir = tempfile::tempdir().unwrap();
    let mut sink = JsonFileSink::new(dir.path());
    let summary = runner.run(1, &bound, &mut sink).await.unwrap();

    assert_run_complete(&summary);
    assert_eq!(observer.started().len(), 9);
    assert!(observer.errors().is_empty());

    let collection = sink.load_day(1).unwrap();
    assert_eq!(flatten(&collection).len(), 11);

    let report = deduplicate(&LinkCollection::from(&collection));
    assert_collision(&report, "https://shared.example");
    let warning = report.warning.as_ref().unwrap();
    assert_eq!(warning.urls, vec!["https://shared.example"]);
    let mut segments = warning.segments.clone();
    segments.sort_unstable();
    assert_eq!(segments, vec![2, 5]);

    let mut queue = ExtractionQueue::from_report(&report);
    assert_eq!(queue.len(), 10);
    let extractor = FakeExtractor::default();
    let outcome = queue.drain(&extractor).await;
    assert_eq!(outcome.extracted.len(), 10);
    assert!(outcome.failed.is_empty());
}

#[test]
fn dedup_from_stored_documents() {
    let report = coast_search::results::deduplicate_value(json!({
        "results": [
            [
                {"segment_id": 3, "links": ["https://u", "https://v"]},
                {"segment_id": 6, "links": ["https://u"]}
            ],
            [
                {"segment_id": 4, "links": []},
                {"segment_id": 7, "links": null}
            ]
        ]
    }))
    .unwrap();

    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        json!({
            "deduplicated_urls": ["https://u", "https://v", "https://u"],
            "warning": {
                "message": "same url found across more than 1 segment",
                "urls": ["https://u"],
                "segments": [3, 6]
            }
        })
    );
}

#[test]
fn configuration_errors_surface_as_coast_errors() {
    let segments = QueryPlanner::new()
        .plan_with_phrase(&three_dimensions(), "a b c")
        .unwrap()
        .segments;
    let credentials: Vec<Credential> = (0..2)
        .map(|i| Credential::new(format!("g{i}"), "k", format!("cx{i}")))
        .collect();

    let err = merge(segments, &credentials).unwrap_err();
    assert!(matches!(err, CoastError::Configuration(_)));

    let err = QueryPlanner::new()
        .plan_with_phrase(&[], "a b c")
        .unwrap_err();
    assert!(matches!(
        err,
        CoastError::Configuration(ConfigurationError::NoDimensions)
    ));
}
