//! Fixture builders for dimensions, provider responses and study files.

use std::fs;
use std::io;
use std::path::Path;

use crate::config::RunConfig;
use crate::dimensions::Dimension;
use crate::results::{
    ApiInfo, ApiItem, ApiQueries, ApiRequest, ApiResponse, ResponseInfo, SearchInformation,
    SegmentResult, TitleLink, UrlTemplate,
};

const URL_TEMPLATE: &str = "https://www.googleapis.com/customsearch/v1?q={searchTerms}";

/// Start date written by [`write_study_files`].
pub const STUDY_START_DATE: &str = "01-03-2019";

/// Three small dimensions totalling eight words.
///
/// With a one-word seed and a three-word random phrase the total is twelve.
#[must_use]
pub fn three_dimensions() -> Vec<Dimension> {
    vec![
        Dimension::new("topic", ["credibility", "assessment"]),
        Dimension::new("reasoning", ["because", "therefore"]),
        Dimension::new("experience", ["I felt", "my experience"]),
    ]
}

/// A provider response with the given `(title, link)` hits.
#[must_use]
pub fn api_response(hits: &[(&str, &str)], start_index: u32) -> ApiResponse {
    ApiResponse {
        items: hits
            .iter()
            .map(|(title, link)| ApiItem {
                title: (*title).to_string(),
                link: (*link).to_string(),
            })
            .collect(),
        queries: ApiQueries {
            request: vec![ApiRequest {
                cx: "cx".to_string(),
                count: 10,
                total_results: hits.len().to_string(),
                start_index,
                search_terms: "query".to_string(),
            }],
        },
        search_information: SearchInformation {
            search_time: 0.1,
            total_results: hits.len().to_string(),
        },
        url: UrlTemplate {
            template: URL_TEMPLATE.to_string(),
        },
    }
}

/// A stored result for `segment_id` with the given `(title, link)` hits.
///
/// The query is `"query for segment <id>"` and the API key is `"key"`.
#[must_use]
pub fn segment_result(segment_id: u32, hits: &[(&str, &str)]) -> SegmentResult {
    SegmentResult {
        segment_id,
        query_string: format!("query for segment {segment_id}"),
        api_info: ApiInfo {
            api_key: "key".to_string(),
            search_engine_id: "cx".to_string(),
        },
        number_of_results_specified: Some(10),
        response_info: ResponseInfo {
            search_info_total_results: hits.len().to_string(),
            search_time: 0.1,
            url_template: URL_TEMPLATE.to_string(),
            requests: Vec::new(),
        },
        results: hits
            .iter()
            .map(|(title, link)| TitleLink::new(*title, *link))
            .collect(),
        links: hits.iter().map(|(_, link)| (*link).to_string()).collect(),
    }
}

/// Writes [`three_dimensions`] as word-list files plus an API details file
/// with `engines` credentials (`cx0`, `cx1`, ...) and returns a config
/// pointing at them.
pub fn write_study_files(dir: &Path, engines: usize) -> io::Result<RunConfig> {
    let mut dimension_files = Vec::new();
    for dimension in three_dimensions() {
        let path = dir.join(format!("{}.txt", dimension.name));
        fs::write(&path, dimension.words.join("\n"))?;
        dimension_files.push(path);
    }

    let search_engines: Vec<serde_json::Value> = (0..engines)
        .map(|i| {
            serde_json::json!({
                "name": format!("google{i}"),
                "api_key": format!("key{i}"),
                "search_engine_id": format!("cx{i}"),
            })
        })
        .collect();
    let api_path = dir.join("api.json");
    fs::write(
        &api_path,
        serde_json::json!({ "search_engines": search_engines }).to_string(),
    )?;

    Ok(RunConfig::new(STUDY_START_DATE, dimension_files, api_path))
}
