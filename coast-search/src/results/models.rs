//! Stored result documents.
//!
//! A [`SegmentResult`] is what one search request produces once it has been
//! reduced to the fields the study keeps. Runs are stored as
//! `{"results": [[SegmentResult, ...], ...]}`, one inner list per run.

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::MalformedInputError;

/// A title/link pair returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleLink {
    /// Result title.
    pub title: String,
    /// Result URL.
    pub link: String,
}

impl TitleLink {
    /// Creates a new title/link pair.
    #[must_use]
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}

/// Credentials a request was made with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiInfo {
    /// Provider API key.
    pub api_key: String,
    /// Custom search engine id.
    pub search_engine_id: String,
}

/// Echo of one request entry in the provider response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestInfo {
    /// Engine id the provider saw.
    pub request_cx: String,
    /// Results requested.
    pub request_count: u32,
    /// Total results reported for this request.
    pub total_results: String,
    /// 1-based index of the first result.
    pub start_index: u32,
    /// Query the provider executed.
    pub search_terms: String,
}

/// Response-level metadata kept with each result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseInfo {
    /// Estimated total results.
    pub search_info_total_results: String,
    /// Provider search time in seconds.
    pub search_time: f64,
    /// OpenSearch URL template.
    pub url_template: String,
    /// Per-request echo.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub requests: Vec<RequestInfo>,
}

/// One stored search response for a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentResult {
    /// Segment the request belonged to.
    pub segment_id: u32,
    /// Query that was executed.
    pub query_string: String,
    /// Credentials used.
    pub api_info: ApiInfo,
    /// Results asked for per run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_results_specified: Option<u32>,
    /// Response metadata.
    pub response_info: ResponseInfo,
    /// Title/link pairs, in rank order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<TitleLink>,
    /// Result URLs, in rank order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub links: Vec<String>,
}

/// All stored results for a day: one list of segment results per run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunCollection {
    /// `results[run][item]`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<Vec<SegmentResult>>,
}

impl RunCollection {
    /// Creates a collection with a single run.
    #[must_use]
    pub fn single(run: Vec<SegmentResult>) -> Self {
        Self {
            results: vec![run],
        }
    }

    /// Parses a collection, rejecting documents without the required keys.
    pub fn from_value(value: serde_json::Value) -> Result<Self, MalformedInputError> {
        serde_json::from_value(value).map_err(|e| MalformedInputError::from_serde("run collection", &e))
    }

    /// Parses a collection from JSON text.
    pub fn from_json(json: &str) -> Result<Self, MalformedInputError> {
        serde_json::from_str(json).map_err(|e| MalformedInputError::from_serde("run collection", &e))
    }

    /// Iterates over every item in visit order.
    pub fn items(&self) -> impl Iterator<Item = &SegmentResult> {
        self.results.iter().flatten()
    }
}

/// The subset of a segment result the deduplicator needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkItem {
    /// Segment the links came from.
    pub segment_id: u32,
    /// Result URLs.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub links: Vec<String>,
}

impl LinkItem {
    /// Creates a new link item.
    #[must_use]
    pub fn new<I, S>(segment_id: u32, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segment_id,
            links: links.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<&SegmentResult> for LinkItem {
    fn from(result: &SegmentResult) -> Self {
        Self {
            segment_id: result.segment_id,
            links: result.links.clone(),
        }
    }
}

/// Run collection reduced to segment ids and links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCollection {
    /// `results[run][item]`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<Vec<LinkItem>>,
}

impl LinkCollection {
    /// Parses a collection; only `segment_id` is required per item.
    pub fn from_value(value: serde_json::Value) -> Result<Self, MalformedInputError> {
        serde_json::from_value(value)
            .map_err(|e| MalformedInputError::from_serde("link collection", &e))
    }

    /// Parses a collection from JSON text.
    pub fn from_json(json: &str) -> Result<Self, MalformedInputError> {
        serde_json::from_str(json).map_err(|e| MalformedInputError::from_serde("link collection", &e))
    }
}

impl From<&RunCollection> for LinkCollection {
    fn from(collection: &RunCollection) -> Self {
        Self {
            results: collection
                .results
                .iter()
                .map(|run| run.iter().map(LinkItem::from).collect())
                .collect(),
        }
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
