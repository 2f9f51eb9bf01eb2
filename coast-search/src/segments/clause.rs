//! Positive and negative query clauses for a dimension.

use serde::{Deserialize, Serialize};

use crate::dimensions::Dimension;

/// The rendered query fragments for one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionClauses {
    /// Dimension name.
    pub name: String,
    /// Every word quoted and OR-joined inside parentheses.
    pub positive: String,
    /// Every word quoted and negated, each followed by a space.
    pub negative: String,
    /// Number of words or phrases the clauses were rendered from.
    pub words: usize,
}

impl DimensionClauses {
    /// Renders both clauses for a dimension.
    #[must_use]
    pub fn from_dimension(dimension: &Dimension) -> Self {
        Self {
            name: dimension.name.clone(),
            positive: positive_clause(&dimension.words),
            negative: negative_clause(&dimension.words),
            words: dimension.words.len(),
        }
    }

    /// Whether the clauses were rendered from an empty word list.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words == 0
    }
}

/// `("a" OR "b" OR "c")`
#[must_use]
pub fn positive_clause<S: AsRef<str>>(words: &[S]) -> String {
    let quoted: Vec<String> = words.iter().map(|w| quote(w.as_ref())).collect();
    format!("({})", quoted.join(" OR "))
}

/// `-"a" -"b" -"c" `
#[must_use]
pub fn negative_clause<S: AsRef<str>>(words: &[S]) -> String {
    words
        .iter()
        .map(|w| format!("-{} ", quote(w.as_ref())))
        .collect()
}

/// Wraps a phrase in double quotes.
#[must_use]
pub fn quote(phrase: &str) -> String {
    format!("\"{phrase}\"")
}
