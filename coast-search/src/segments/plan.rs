//! End-to-end query planning for a set of dimensions.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

use super::clause::DimensionClauses;
use super::generator::{generate, Segment};
use super::random::{RandomPhraseGenerator, WordSource};
use crate::dimensions::{validate_dimensions, Dimension};
use crate::errors::Result;
use crate::validation::{validate_query_length, DEFAULT_MAX_WORDS};

/// The generated segments together with the inputs that shaped them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentPlan {
    /// Seed phrase used for segment 1.
    pub seed: String,
    /// Random phrase used for segment 0.
    pub random_phrase: String,
    /// Word count checked against the provider limit.
    pub total_words: usize,
    /// Segments ordered by id.
    pub segments: Vec<Segment>,
}

impl SegmentPlan {
    /// SHA-256 over every segment's id, logic and query, hex encoded.
    ///
    /// Two plans built from identical inputs share a fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for segment in &self.segments {
            hasher.update(segment.segment_id.to_be_bytes());
            hasher.update(segment.logic.as_bytes());
            hasher.update([0u8]);
            hasher.update(segment.query.as_bytes());
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the plan has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Builds segment plans from dimensions.
#[derive(Debug, Clone)]
pub struct QueryPlanner {
    seed: String,
    max_words: usize,
    phrases: RandomPhraseGenerator,
}

impl Default for QueryPlanner {
    fn default() -> Self {
        Self {
            seed: "software".to_string(),
            max_words: DEFAULT_MAX_WORDS,
            phrases: RandomPhraseGenerator::default(),
        }
    }
}

impl QueryPlanner {
    /// Creates a planner with the default seed and word limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the seed phrase.
    #[must_use]
    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = seed.into();
        self
    }

    /// Sets the provider word limit.
    #[must_use]
    pub fn with_max_words(mut self, max_words: usize) -> Self {
        self.max_words = max_words;
        self
    }

    /// Sets the random phrase generator.
    #[must_use]
    pub fn with_phrase_generator(mut self, phrases: RandomPhraseGenerator) -> Self {
        self.phrases = phrases;
        self
    }

    /// Validates the dimensions, draws a random phrase, checks the word
    /// limit and generates every segment.
    pub fn plan<W: WordSource + ?Sized>(
        &self,
        dimensions: &[Dimension],
        source: &mut W,
    ) -> Result<SegmentPlan> {
        validate_dimensions(dimensions)?;

        let random_phrase = self.phrases.generate(source, &excluded_words(dimensions))?;
        self.plan_with_phrase(dimensions, random_phrase)
    }

    /// Same as [`QueryPlanner::plan`] with an explicit random phrase.
    pub fn plan_with_phrase(
        &self,
        dimensions: &[Dimension],
        random_phrase: impl Into<String>,
    ) -> Result<SegmentPlan> {
        validate_dimensions(dimensions)?;
        let random_phrase = random_phrase.into();

        let word_lists: Vec<Vec<String>> = dimensions.iter().map(|d| d.words.clone()).collect();
        let total_words =
            validate_query_length(&self.seed, &random_phrase, &word_lists, self.max_words)?;

        let clauses: Vec<DimensionClauses> =
            dimensions.iter().map(DimensionClauses::from_dimension).collect();
        let segments = generate(&clauses, &self.seed, &random_phrase)?;

        Ok(SegmentPlan {
            seed: self.seed.clone(),
            random_phrase,
            total_words,
            segments,
        })
    }
}

/// Union of every dimension word, used as the random phrase stop list.
#[must_use]
pub fn excluded_words(dimensions: &[Dimension]) -> HashSet<String> {
    dimensions
        .iter()
        .flat_map(|d| d.words.iter().cloned())
        .collect()
}

/// Plans queries with the given seed and word limit.
pub fn plan_queries<W: WordSource + ?Sized>(
    dimensions: &[Dimension],
    seed: &str,
    max_words: usize,
    source: &mut W,
) -> Result<SegmentPlan> {
    QueryPlanner::new()
        .with_seed(seed)
        .with_max_words(max_words)
        .plan(dimensions, source)
}
