//! Testing utilities for segment planning and search runs.
//!
//! This module provides:
//! - Fake word sources, search clients, observers and extractors
//! - Fixture builders for dimensions, responses and study files
//! - Assertions for plans, runs and dedup reports

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{
    assert_collision, assert_no_collisions, assert_run_complete, assert_segment_ids,
    assert_segment_logic,
};
pub use fixtures::{
    api_response, segment_result, three_dimensions, write_study_files, STUDY_START_DATE,
};
pub use mocks::{
    FakeExtractor, FixedWordSource, RecordingObserver, ScriptedSearchClient, SequenceWordSource,
};
