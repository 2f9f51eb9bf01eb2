//! Query segmentation.
//!
//! This module provides:
//! - Positive/negative clause rendering per dimension
//! - The subset enumeration and segment generator
//! - Random baseline phrases behind the [`WordSource`] trait
//! - [`QueryPlanner`], which ties validation and generation together

mod clause;
mod generator;
mod plan;
mod random;

pub use clause::{negative_clause, positive_clause, quote, DimensionClauses};
pub use generator::{
    enumerate_subsets, expected_segment_count, generate, Segment, FIRST_SUBSET_SEGMENT_ID,
    MAX_DIMENSIONS, RANDOM_SEGMENT_ID, SEED_SEGMENT_ID,
};
pub use plan::{excluded_words, plan_queries, QueryPlanner, SegmentPlan};
pub use random::{
    RandomPhraseGenerator, VocabularyWordSource, WordSource, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_VOCABULARY, DEFAULT_WORDS_PER_PHRASE,
};
