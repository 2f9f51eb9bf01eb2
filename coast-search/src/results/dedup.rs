//! Cross-segment URL deduplication.
//!
//! Each stored item's links are first reduced to a set (first occurrence
//! order). The sets are concatenated into `deduplicated_urls`, so a URL found
//! by two items appears twice there. Any URL that occurs more than once in the
//! concatenation is reported in the warning along with the segment id of
//! every item that contained it.
//!
//! A URL returned by two items of the same segment (for example two runs of
//! the same query) is reported the same way, with that segment's id listed
//! once per item.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::models::{LinkCollection, LinkItem};
use crate::errors::Result;

/// Message attached to every collision warning.
pub const COLLISION_MESSAGE: &str = "same url found across more than 1 segment";

/// URLs found by more than one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupWarning {
    /// Always [`COLLISION_MESSAGE`].
    pub message: String,
    /// Colliding URLs, in discovery order.
    pub urls: Vec<String>,
    /// For each colliding URL in turn, the segment id of every item containing it.
    pub segments: Vec<u32>,
}

/// Result of deduplicating a run collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupReport {
    /// Concatenation of every item's link set.
    pub deduplicated_urls: Vec<String>,
    /// Present only when at least one collision was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<DedupWarning>,
}

impl DedupReport {
    /// Whether any URL was found by more than one item.
    #[must_use]
    pub fn has_collisions(&self) -> bool {
        self.warning.is_some()
    }

    /// The concatenated URLs with repeats removed, first occurrence kept.
    #[must_use]
    pub fn unique_urls(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.deduplicated_urls
            .iter()
            .filter(|url| seen.insert(url.as_str()))
            .map(String::as_str)
            .collect()
    }
}

/// Deduplicates the links of every item in a collection.
#[must_use]
pub fn deduplicate(collection: &LinkCollection) -> DedupReport {
    let items: Vec<&LinkItem> = collection.results.iter().flatten().collect();
    let link_sets: Vec<Vec<&str>> = items.iter().map(|item| ordered_set(&item.links)).collect();

    let deduplicated_urls: Vec<String> = link_sets
        .iter()
        .flatten()
        .map(|url| (*url).to_string())
        .collect();

    // Segment id of every item holding each url, in item order.
    let mut holders: HashMap<&str, Vec<u32>> = HashMap::new();
    for (item, set) in items.iter().zip(&link_sets) {
        for url in set {
            holders.entry(url).or_default().push(item.segment_id);
        }
    }

    let mut urls = Vec::new();
    let mut segments = Vec::new();
    for url in link_sets.iter().flatten() {
        let Some(ids) = holders.remove(url) else {
            continue;
        };
        if ids.len() < 2 {
            continue;
        }
        urls.push((*url).to_string());
        segments.extend(ids);
    }

    let warning = if urls.is_empty() {
        None
    } else {
        tracing::warn!(
            collisions = urls.len(),
            ?segments,
            "{}",
            COLLISION_MESSAGE
        );
        Some(DedupWarning {
            message: COLLISION_MESSAGE.to_string(),
            urls,
            segments,
        })
    };

    tracing::info!(
        items = items.len(),
        urls = deduplicated_urls.len(),
        "Deduplicated segment urls"
    );

    DedupReport {
        deduplicated_urls,
        warning,
    }
}

/// Parses a raw collection and deduplicates it.
pub fn deduplicate_value(value: serde_json::Value) -> Result<DedupReport> {
    let collection = LinkCollection::from_value(value)?;
    Ok(deduplicate(&collection))
}

fn ordered_set(links: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    links
        .iter()
        .map(String::as_str)
        .filter(|url| seen.insert(*url))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn collection(runs: Vec<Vec<LinkItem>>) -> LinkCollection {
        LinkCollection { results: runs }
    }

    #[test]
    fn test_no_collisions_has_no_warning() {
        let report = deduplicate(&collection(vec![vec![
            LinkItem::new(2, ["https://a", "https://b"]),
            LinkItem::new(3, ["https://c"]),
        ]]));

        assert_eq!(report.deduplicated_urls, vec!["https://a", "https://b", "https://c"]);
        assert!(report.warning.is_none());
        assert!(!report.has_collisions());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("warning").is_none());
    }

    #[test]
    fn test_within_item_duplicates_collapse() {
        let report = deduplicate(&collection(vec![vec![LinkItem::new(
            2,
            ["https://a", "https://a", "https://b"],
        )]]));

        assert_eq!(report.deduplicated_urls, vec!["https://a", "https://b"]);
        assert!(report.warning.is_none());
    }

    #[test]
    fn test_cross_segment_collision() {
        let report = deduplicate(&collection(vec![vec![
            LinkItem::new(2, ["https://a", "https://shared"]),
            LinkItem::new(3, ["https://shared", "https://b"]),
        ]]));

        assert_eq!(
            report.deduplicated_urls,
            vec!["https://a", "https://shared", "https://shared", "https://b"]
        );
        assert_eq!(
            report.warning,
            Some(DedupWarning {
                message: COLLISION_MESSAGE.to_string(),
                urls: vec!["https://shared".to_string()],
                segments: vec![2, 3],
            })
        );
        assert_eq!(report.unique_urls(), vec!["https://a", "https://shared", "https://b"]);
    }

    #[test]
    fn test_collisions_reported_in_discovery_order() {
        let report = deduplicate(&collection(vec![
            vec![
                LinkItem::new(2, ["https://y", "https://x"]),
                LinkItem::new(5, ["https://x"]),
            ],
            vec![LinkItem::new(7, ["https://y", "https://x"])],
        ]));

        let warning = report.warning.unwrap();
        assert_eq!(warning.urls, vec!["https://y", "https://x"]);
        assert_eq!(warning.segments, vec![2, 7, 2, 5, 7]);
    }

    #[test]
    fn test_same_segment_repeats_are_listed_per_item() {
        let report = deduplicate(&collection(vec![
            vec![LinkItem::new(4, ["https://a"])],
            vec![LinkItem::new(4, ["https://a"])],
        ]));

        let warning = report.warning.unwrap();
        assert_eq!(warning.urls, vec!["https://a"]);
        assert_eq!(warning.segments, vec![4, 4]);
    }

    #[test]
    fn test_large_collection_lists_every_holding_item() {
        let items: Vec<LinkItem> = (0..200u32)
            .map(|id| {
                let own = format!("https://own/{id}");
                let shared = format!("https://shared/{}", id % 4);
                LinkItem::new(id, [own, shared])
            })
            .collect();
        let report = deduplicate(&collection(vec![items]));

        assert_eq!(report.deduplicated_urls.len(), 400);
        assert_eq!(report.unique_urls().len(), 204);

        let warning = report.warning.unwrap();
        assert_eq!(
            warning.urls,
            vec![
                "https://shared/0",
                "https://shared/1",
                "https://shared/2",
                "https://shared/3"
            ]
        );
        assert_eq!(warning.segments.len(), 200);
        assert_eq!(&warning.segments[..3], &[0, 4, 8]);
        assert_eq!(&warning.segments[50..53], &[1, 5, 9]);
    }

    #[test]
    fn test_empty_and_missing_links() {
        let report = deduplicate_value(serde_json::json!({
            "results": [[{"segment_id": 2}, {"segment_id": 3, "links": []}], []]
        }))
        .unwrap();
        assert!(report.deduplicated_urls.is_empty());
        assert!(report.warning.is_none());
    }

    #[test]
    fn test_deduplicate_value_rejects_missing_segment_id() {
        let err = deduplicate_value(serde_json::json!({"results": [[{"links": ["u"]}]]}))
            .unwrap_err();
        assert!(matches!(err, crate::errors::CoastError::MalformedInput(_)));
    }
}
