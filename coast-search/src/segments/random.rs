//! Random baseline phrases.
//!
//! Segment 0 is anchored on a phrase of unrelated words so that it samples the
//! part of the index outside every dimension. The words come from a pluggable
//! [`WordSource`]; a phrase is redrawn while any of its words is also a
//! dimension word.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;
use std::path::Path;

use crate::errors::{Result, VocabularyExhaustionError};

/// Number of words in a random phrase.
pub const DEFAULT_WORDS_PER_PHRASE: usize = 3;
/// Draws attempted before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 1000;

/// General-purpose vocabulary for [`VocabularyWordSource::builtin`].
pub const DEFAULT_VOCABULARY: &[&str] = &[
    "anchor", "apron", "attic", "badge", "bakery", "balcony", "banjo", "barrel", "basket",
    "beacon", "bicycle", "blanket", "bottle", "bracelet", "bridge", "bucket", "cabin", "cactus",
    "candle", "canyon", "carpet", "castle", "cellar", "chimney", "circus", "closet", "comet",
    "compass", "cottage", "crayon", "cushion", "dolphin", "drawer", "dune", "easel", "engine",
    "feather", "ferry", "fiddle", "forest", "fountain", "garden", "glacier", "goblet", "granite",
    "gravel", "hammock", "harbor", "helmet", "hive", "island", "jacket", "jungle", "kettle",
    "kitten", "ladder", "lantern", "lemon", "lighthouse", "lizard", "magnet", "maple", "marble",
    "meadow", "mitten", "mug", "needle", "oasis", "orchard", "otter", "paddle", "parrot",
    "pebble", "pepper", "pillow", "pine", "plum", "pond", "puddle", "quilt", "rabbit", "raft",
    "regions", "ribbon", "saddle", "sandal", "scarf", "shovel", "sparrow", "spoon", "squirrel",
    "stable", "statue", "straw", "sunflower", "teapot", "thimble", "tractor", "tulip", "tunnel",
    "umbrella", "valley", "velvet", "violin", "volcano", "wagon", "walnut", "whistle", "willow",
    "window", "yarn", "zebra",
];

/// A source of vocabulary words.
#[cfg_attr(test, mockall::automock)]
pub trait WordSource: Send {
    /// Draws `count` distinct words. Returns fewer only when the source is exhausted.
    fn draw(&mut self, count: usize) -> Vec<String>;
}

/// Draws words uniformly from an in-memory vocabulary.
#[derive(Debug, Clone)]
pub struct VocabularyWordSource {
    vocabulary: Vec<String>,
    rng: StdRng,
}

impl VocabularyWordSource {
    /// Creates a source seeded from the operating system.
    #[must_use]
    pub fn new<I, S>(vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vocabulary: vocabulary.into_iter().map(Into::into).collect(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a reproducible source.
    #[must_use]
    pub fn with_seed<I, S>(vocabulary: I, seed: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vocabulary: vocabulary.into_iter().map(Into::into).collect(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates a source over [`DEFAULT_VOCABULARY`].
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(DEFAULT_VOCABULARY.iter().copied())
    }

    /// Loads a vocabulary file with one word per line.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::new(
            contents
                .lines()
                .map(str::trim)
                .filter(|w| !w.is_empty())
                .map(String::from),
        ))
    }

    /// Number of words available.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Whether the vocabulary is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }
}

impl WordSource for VocabularyWordSource {
    fn draw(&mut self, count: usize) -> Vec<String> {
        self.vocabulary
            .choose_multiple(&mut self.rng, count)
            .cloned()
            .collect()
    }
}

/// Draws random phrases that avoid a set of excluded words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomPhraseGenerator {
    /// Words per phrase.
    pub words_per_phrase: usize,
    /// Draws attempted before failing.
    pub max_attempts: usize,
}

impl Default for RandomPhraseGenerator {
    fn default() -> Self {
        Self {
            words_per_phrase: DEFAULT_WORDS_PER_PHRASE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl RandomPhraseGenerator {
    /// Creates a generator with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the retry bound.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the phrase length.
    #[must_use]
    pub fn with_words_per_phrase(mut self, words: usize) -> Self {
        self.words_per_phrase = words;
        self
    }

    /// Draws a space-joined phrase none of whose words are in `excluded`.
    ///
    /// Matching is exact and case-sensitive.
    pub fn generate<W: WordSource + ?Sized>(
        &self,
        source: &mut W,
        excluded: &HashSet<String>,
    ) -> Result<String, VocabularyExhaustionError> {
        for attempt in 1..=self.max_attempts {
            let words = source.draw(self.words_per_phrase);
            if words.len() < self.words_per_phrase {
                tracing::warn!(
                    requested = self.words_per_phrase,
                    drawn = words.len(),
                    "Word source exhausted"
                );
                return Err(VocabularyExhaustionError::new(attempt, self.words_per_phrase));
            }

            if words.iter().any(|w| excluded.contains(w)) {
                tracing::debug!(attempt, ?words, "Random phrase hit a dimension word, redrawing");
                continue;
            }

            return Ok(words.join(" "));
        }

        Err(VocabularyExhaustionError::new(
            self.max_attempts,
            self.words_per_phrase,
        ))
    }
}
