//! Error types for coast-search.
//!
//! Every failure in the query engine is a deterministic function of its input
//! and is raised synchronously. The taxonomy mirrors the three ways a run can
//! be rejected: bad configuration, an exhausted random vocabulary, or response
//! documents that do not have the expected shape.

use std::collections::HashMap;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = CoastError> = std::result::Result<T, E>;

/// The main error type for coast-search operations.
#[derive(Debug, Error)]
pub enum CoastError {
    /// The run configuration is invalid.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// No usable random phrase could be drawn.
    #[error("{0}")]
    VocabularyExhaustion(#[from] VocabularyExhaustionError),

    /// A response document did not match the expected schema.
    #[error("{0}")]
    MalformedInput(#[from] MalformedInputError),

    /// A search request failed.
    #[error("Search request failed: {0}")]
    Search(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for CoastError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Errors raised when the run configuration cannot be used.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The credential list cannot be mapped onto the segment list.
    #[error(
        "credential count ({credentials}) does not match segment count ({segments}) and is not exactly one"
    )]
    CredentialCount {
        /// Number of credentials supplied.
        credentials: usize,
        /// Number of segments generated.
        segments: usize,
    },

    /// The combined keyword count exceeds the provider limit.
    #[error("The maximum number of keywords is: {max_words}, you have: {total_words}")]
    QueryTooLong {
        /// The provider limit.
        max_words: usize,
        /// The number of words the configuration would use.
        total_words: usize,
    },

    /// No dimensions were supplied.
    #[error("at least one dimension is required")]
    NoDimensions,

    /// A dimension has no words.
    #[error("dimension '{name}' has no words")]
    EmptyDimension {
        /// The dimension name.
        name: String,
    },

    /// Two dimensions share a name.
    #[error("dimension '{name}' is defined more than once")]
    DuplicateDimension {
        /// The dimension name.
        name: String,
    },

    /// A word appears twice in the same dimension.
    #[error("dimension '{name}' lists '{word}' more than once")]
    DuplicateWord {
        /// The dimension name.
        name: String,
        /// The repeated word or phrase.
        word: String,
    },

    /// A configuration value is invalid.
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        /// The offending field.
        field: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl ConfigurationError {
    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();

        match self {
            Self::CredentialCount { credentials, segments } => {
                map.insert("type".to_string(), serde_json::json!("CredentialCount"));
                map.insert("credentials".to_string(), serde_json::json!(credentials));
                map.insert("segments".to_string(), serde_json::json!(segments));
            }
            Self::QueryTooLong { max_words, total_words } => {
                map.insert("type".to_string(), serde_json::json!("QueryTooLong"));
                map.insert("max_words".to_string(), serde_json::json!(max_words));
                map.insert("total_words".to_string(), serde_json::json!(total_words));
            }
            Self::NoDimensions => {
                map.insert("type".to_string(), serde_json::json!("NoDimensions"));
            }
            Self::EmptyDimension { name } => {
                map.insert("type".to_string(), serde_json::json!("EmptyDimension"));
                map.insert("name".to_string(), serde_json::json!(name));
            }
            Self::DuplicateDimension { name } => {
                map.insert("type".to_string(), serde_json::json!("DuplicateDimension"));
                map.insert("name".to_string(), serde_json::json!(name));
            }
            Self::DuplicateWord { name, word } => {
                map.insert("type".to_string(), serde_json::json!("DuplicateWord"));
                map.insert("name".to_string(), serde_json::json!(name));
                map.insert("word".to_string(), serde_json::json!(word));
            }
            Self::InvalidValue { field, reason } => {
                map.insert("type".to_string(), serde_json::json!("InvalidValue"));
                map.insert("field".to_string(), serde_json::json!(field));
                map.insert("reason".to_string(), serde_json::json!(reason));
            }
        }

        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

/// Error raised when the random phrase generator gives up.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("could not draw {words_per_phrase} unused words after {attempts} attempts")]
pub struct VocabularyExhaustionError {
    /// Number of draws made before giving up.
    pub attempts: usize,
    /// Number of words each phrase needs.
    pub words_per_phrase: usize,
}

impl VocabularyExhaustionError {
    /// Creates a new vocabulary exhaustion error.
    #[must_use]
    pub fn new(attempts: usize, words_per_phrase: usize) -> Self {
        Self {
            attempts,
            words_per_phrase,
        }
    }
}

/// Error raised when a result document does not match the expected shape.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Malformed {document}: {reason}")]
pub struct MalformedInputError {
    /// The kind of document being parsed.
    pub document: String,
    /// What was wrong with it.
    pub reason: String,
}

impl MalformedInputError {
    /// Creates a new malformed input error.
    #[must_use]
    pub fn new(document: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            reason: reason.into(),
        }
    }

    /// Wraps a serde error raised while decoding `document`.
    #[must_use]
    pub fn from_serde(document: impl Into<String>, err: &serde_json::Error) -> Self {
        Self::new(document, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_count_message() {
        let err = ConfigurationError::CredentialCount {
            credentials: 2,
            segments: 9,
        };
        let msg = err.to_string();
        assert!(msg.contains("does not match segment count"));
        assert!(msg.contains("not exactly one"));
    }

    #[test]
    fn test_configuration_error_to_dict() {
        let err = ConfigurationError::QueryTooLong {
            max_words: 32,
            total_words: 33,
        };
        let dict = err.to_dict();

        assert_eq!(dict.get("type").unwrap(), "QueryTooLong");
        assert_eq!(dict["max_words"], serde_json::json!(32));
        assert_eq!(dict["total_words"], serde_json::json!(33));
    }

    #[test]
    fn test_coast_error_from_parts() {
        let err: CoastError = VocabularyExhaustionError::new(10, 3).into();
        assert!(matches!(err, CoastError::VocabularyExhaustion(_)));
        assert!(err.to_string().contains("10 attempts"));

        let err: CoastError = MalformedInputError::new("run collection", "missing field").into();
        assert_eq!(err.to_string(), "Malformed run collection: missing field");
    }
}
