//! Named keyword dimensions and their word-list loaders.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::errors::{ConfigurationError, Result};

/// A named axis of the keyword space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    /// Dimension name, used in segment logic labels.
    pub name: String,
    /// Words or phrases, in file order.
    pub words: Vec<String>,
}

impl Dimension {
    /// Creates a new dimension.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of whitespace-separated words across all phrases.
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.words.iter().map(|w| w.split_whitespace().count()).sum()
    }

    /// Checks that the dimension is non-empty and has no repeated words.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.words.is_empty() {
            return Err(ConfigurationError::EmptyDimension {
                name: self.name.clone(),
            });
        }

        let mut seen = HashSet::new();
        for word in &self.words {
            if !seen.insert(word.as_str()) {
                return Err(ConfigurationError::DuplicateWord {
                    name: self.name.clone(),
                    word: word.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Validates a full dimension set: at least one, unique names, each valid.
pub fn validate_dimensions(dimensions: &[Dimension]) -> Result<(), ConfigurationError> {
    if dimensions.is_empty() {
        return Err(ConfigurationError::NoDimensions);
    }

    let mut names = HashSet::new();
    for dimension in dimensions {
        if !names.insert(dimension.name.as_str()) {
            return Err(ConfigurationError::DuplicateDimension {
                name: dimension.name.clone(),
            });
        }
        dimension.validate()?;
    }

    Ok(())
}

/// Parses a word list: one phrase per line, `"` replaced by `'`, blank lines skipped.
#[must_use]
pub fn parse_word_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(|line| line.trim_end_matches('\r').replace('"', "'"))
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// Loads one dimension from a word-list file. The file stem becomes the name.
pub fn load_dimension_file(path: impl AsRef<Path>) -> Result<Dimension> {
    let path = path.as_ref();
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            ConfigurationError::invalid_value(
                "dimension_files",
                format!("cannot derive a dimension name from {}", path.display()),
            )
        })?
        .to_string();

    let contents = std::fs::read_to_string(path)?;
    let dimension = Dimension {
        name,
        words: parse_word_list(&contents),
    };

    tracing::debug!(
        dimension = %dimension.name,
        words = dimension.words.len(),
        "Loaded dimension"
    );

    Ok(dimension)
}

/// Loads dimensions from files, keeping the given order.
pub fn load_dimensions<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Dimension>> {
    paths.iter().map(load_dimension_file).collect()
}
