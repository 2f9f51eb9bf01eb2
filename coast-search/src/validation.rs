//! Provider query-length limits.
//!
//! Search providers cap the number of words in a query (32 for Google Custom
//! Search). Every segment query is built from the seed or random phrase plus
//! the words of every dimension, so the total is checked once before any
//! segment is generated. Exceeding the limit fails the run; nothing is
//! truncated.

use crate::errors::ConfigurationError;

/// Google Custom Search word limit.
pub const DEFAULT_MAX_WORDS: usize = 32;

/// Counts the words a configuration would put into its queries.
///
/// Phrases are split on whitespace, so `"software engineering"` counts as two.
#[must_use]
pub fn total_word_count<S: AsRef<str>>(
    seed: &str,
    random_phrase: &str,
    word_lists: &[Vec<S>],
) -> usize {
    let dimension_words: usize = word_lists
        .iter()
        .flatten()
        .map(|phrase| phrase.as_ref().split_whitespace().count())
        .sum();

    seed.split_whitespace().count() + random_phrase.split_whitespace().count() + dimension_words
}

/// Fails with [`ConfigurationError::QueryTooLong`] when the total word count
/// exceeds `max_words`. Returns the total otherwise.
pub fn validate_query_length<S: AsRef<str>>(
    seed: &str,
    random_phrase: &str,
    word_lists: &[Vec<S>],
    max_words: usize,
) -> Result<usize, ConfigurationError> {
    let total_words = total_word_count(seed, random_phrase, word_lists);

    if total_words > max_words {
        tracing::warn!(total_words, max_words, "Query word limit exceeded");
        return Err(ConfigurationError::QueryTooLong {
            max_words,
            total_words,
        });
    }

    tracing::debug!(total_words, max_words, "Query length within limit");
    Ok(total_words)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lists() -> Vec<Vec<&'static str>> {
        vec![
            vec!["software engineering", "code"],
            vec!["because", "therefore", "but"],
        ]
    }

    #[test]
    fn test_total_word_count() {
        // 1 + 3 + (2 + 1) + 3
        assert_eq!(total_word_count("software", "a b c", &lists()), 10);
    }

    #[test]
    fn test_exact_limit_passes() {
        assert_eq!(validate_query_length("software", "a b c", &lists(), 10), Ok(10));
    }

    #[test]
    fn test_one_over_limit_fails() {
        let err = validate_query_length("software dev", "a b c", &lists(), 10).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::QueryTooLong {
                max_words: 10,
                total_words: 11,
            }
        );
    }

    #[test]
    fn test_extra_whitespace_is_not_counted() {
        let lists: Vec<Vec<String>> = vec![vec!["  spaced   out  ".to_string()]];
        assert_eq!(total_word_count(" seed ", "x  y", &lists), 5);
    }
}
