//! Flattening stored runs into one record per search hit.

use serde::{Deserialize, Serialize};

use super::models::{ApiInfo, ResponseInfo, RunCollection};
use crate::errors::Result;

/// One search hit with its segment-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Result title.
    pub title: String,
    /// Result URL.
    pub url: String,
    /// Segment the hit belongs to.
    pub segment_id: u32,
    /// Query that produced it.
    pub query: String,
    /// Credentials used.
    pub api_info: ApiInfo,
    /// Response metadata.
    pub response_info: ResponseInfo,
}

/// Produces one record per `(item, title/link)` pair, in visit order.
///
/// Items without results contribute nothing.
#[must_use]
pub fn flatten(collection: &RunCollection) -> Vec<ResultRecord> {
    let records: Vec<ResultRecord> = collection
        .items()
        .flat_map(|item| {
            item.results.iter().map(move |hit| ResultRecord {
                title: hit.title.clone(),
                url: hit.link.clone(),
                segment_id: item.segment_id,
                query: item.query_string.clone(),
                api_info: item.api_info.clone(),
                response_info: item.response_info.clone(),
            })
        })
        .collect();

    tracing::debug!(
        runs = collection.results.len(),
        records = records.len(),
        "Flattened search results"
    );

    records
}

/// Parses a raw run collection and flattens it.
pub fn flatten_value(value: serde_json::Value) -> Result<Vec<ResultRecord>> {
    let collection = RunCollection::from_value(value)?;
    Ok(flatten(&collection))
}
