//! Attaching search-engine credentials to generated segments.

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigurationError, Result};
use crate::segments::Segment;

/// One search engine entry from the API details file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Display name of the engine.
    pub name: String,
    /// Provider API key.
    pub api_key: String,
    /// Custom search engine id (`cx`).
    pub search_engine_id: String,
}

impl Credential {
    /// Creates a new credential.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        api_key: impl Into<String>,
        search_engine_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            api_key: api_key.into(),
            search_engine_id: search_engine_id.into(),
        }
    }
}

/// A segment ready to be executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundSegment {
    /// The generated segment.
    #[serde(flatten)]
    pub segment: Segment,
    /// Name of the engine the segment runs against.
    pub se_name: String,
    /// Provider API key.
    pub api_key: String,
    /// Custom search engine id.
    pub search_engine_id: String,
}

impl BoundSegment {
    /// Binds a credential to a segment.
    #[must_use]
    pub fn new(segment: Segment, credential: &Credential) -> Self {
        Self {
            segment,
            se_name: credential.name.clone(),
            api_key: credential.api_key.clone(),
            search_engine_id: credential.search_engine_id.clone(),
        }
    }

    /// The segment id.
    #[must_use]
    pub fn segment_id(&self) -> u32 {
        self.segment.segment_id
    }

    /// The query string.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.segment.query
    }
}

/// Attaches credentials to segments.
///
/// A single credential is shared by every segment; otherwise there must be
/// exactly one credential per segment, applied by position.
pub fn merge(segments: Vec<Segment>, credentials: &[Credential]) -> Result<Vec<BoundSegment>> {
    let bound: Vec<BoundSegment> = match credentials {
        [shared] => segments
            .into_iter()
            .map(|segment| BoundSegment::new(segment, shared))
            .collect(),
        _ if credentials.len() == segments.len() => segments
            .into_iter()
            .zip(credentials)
            .map(|(segment, credential)| BoundSegment::new(segment, credential))
            .collect(),
        _ => {
            return Err(ConfigurationError::CredentialCount {
                credentials: credentials.len(),
                segments: segments.len(),
            }
            .into())
        }
    };

    tracing::info!(
        segments = bound.len(),
        credentials = credentials.len(),
        "Bound credentials to segments"
    );

    Ok(bound)
}
