//! Provider response schema (Google Custom Search JSON API).

use serde::{Deserialize, Serialize};

use super::models::{ApiInfo, RequestInfo, ResponseInfo, SegmentResult, TitleLink};
use crate::binding::BoundSegment;
use crate::errors::MalformedInputError;

/// A single result item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiItem {
    /// Result title.
    pub title: String,
    /// Result URL.
    pub link: String,
}

/// One entry of `queries.request`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequest {
    /// Engine id.
    pub cx: String,
    /// Number of results requested.
    pub count: u32,
    /// Estimated total results; absent when nothing matched.
    #[serde(default)]
    pub total_results: String,
    /// 1-based index of the first result.
    pub start_index: u32,
    /// Executed query.
    pub search_terms: String,
}

/// The `queries` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiQueries {
    /// The request echo.
    #[serde(default)]
    pub request: Vec<ApiRequest>,
}

/// The `searchInformation` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInformation {
    /// Provider search time in seconds.
    pub search_time: f64,
    /// Estimated total results.
    pub total_results: String,
}

/// The `url` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlTemplate {
    /// OpenSearch URL template.
    pub template: String,
}

/// A raw search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    /// Result items; absent when nothing matched.
    #[serde(default)]
    pub items: Vec<ApiItem>,
    /// Request echo.
    pub queries: ApiQueries,
    /// Timing and totals.
    pub search_information: SearchInformation,
    /// URL template.
    pub url: UrlTemplate,
}

impl ApiResponse {
    /// Parses a raw provider response.
    pub fn from_value(value: serde_json::Value) -> Result<Self, MalformedInputError> {
        serde_json::from_value(value).map_err(|e| MalformedInputError::from_serde("api response", &e))
    }
}

impl SegmentResult {
    /// Reduces a provider response to the stored shape.
    #[must_use]
    pub fn from_response(
        bound: &BoundSegment,
        number_of_results: u32,
        response: &ApiResponse,
    ) -> Self {
        let results: Vec<TitleLink> = response
            .items
            .iter()
            .map(|item| TitleLink::new(item.title.clone(), item.link.clone()))
            .collect();
        let links = response.items.iter().map(|item| item.link.clone()).collect();

        let requests = response
            .queries
            .request
            .iter()
            .map(|req| RequestInfo {
                request_cx: req.cx.clone(),
                request_count: req.count,
                total_results: req.total_results.clone(),
                start_index: req.start_index,
                search_terms: req.search_terms.clone(),
            })
            .collect();

        Self {
            segment_id: bound.segment_id(),
            query_string: bound.query().to_string(),
            api_info: ApiInfo {
                api_key: bound.api_key.clone(),
                search_engine_id: bound.search_engine_id.clone(),
            },
            number_of_results_specified: Some(number_of_results),
            response_info: ResponseInfo {
                search_info_total_results: response.search_information.total_results.clone(),
                search_time: response.search_information.search_time,
                url_template: response.url.template.clone(),
                requests,
            },
            results,
            links,
        }
    }
}
