//! Search result documents, aggregation and URL deduplication.
//!
//! This module provides:
//! - The provider response schema and its reduction to stored results
//! - Stored run collections, validated at parse time
//! - Flattening into one record per hit
//! - Cross-segment URL deduplication

mod aggregate;
mod dedup;
mod models;
mod response;

pub use aggregate::{flatten, flatten_value, ResultRecord};
pub use dedup::{deduplicate, deduplicate_value, DedupReport, DedupWarning, COLLISION_MESSAGE};
pub use models::{
    ApiInfo, LinkCollection, LinkItem, RequestInfo, ResponseInfo, RunCollection, SegmentResult,
    TitleLink,
};
pub use response::{
    ApiItem, ApiQueries, ApiRequest, ApiResponse, SearchInformation, UrlTemplate,
};
