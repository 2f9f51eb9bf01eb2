//! Article extraction queue.
//!
//! Deduplicated URLs are queued once each and drained through an
//! [`ArticleExtractor`]. A URL is never queued twice, even after it has been
//! drained, so re-feeding an overlapping report only queues new URLs.

use std::collections::{HashSet, VecDeque};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::results::DedupReport;

/// Content extracted from one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Source URL.
    pub url: String,
    /// Headline, if one was found.
    #[serde(default)]
    pub title: Option<String>,
    /// Body text.
    pub text: String,
    /// Authors, in page order.
    #[serde(default)]
    pub authors: Vec<String>,
    /// Publication time, if the page declares one.
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl Article {
    /// Creates an article with only a URL and body text.
    #[must_use]
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            text: text.into(),
            authors: Vec::new(),
            published_at: None,
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Protocol for turning a URL into an article.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleExtractor: Send + Sync {
    /// Fetches and extracts one URL.
    async fn extract(&self, url: &str) -> Result<Article>;
}

/// A URL that could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedExtraction {
    /// The URL.
    pub url: String,
    /// Error message.
    pub error: String,
}

/// Result of draining the queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    /// Successfully extracted articles, in queue order.
    pub extracted: Vec<Article>,
    /// URLs that failed, in queue order.
    pub failed: Vec<FailedExtraction>,
}

impl ExtractionOutcome {
    /// URLs processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.extracted.len() + self.failed.len()
    }
}

/// FIFO of URLs awaiting extraction.
#[derive(Debug, Clone, Default)]
pub struct ExtractionQueue {
    pending: VecDeque<String>,
    seen: HashSet<String>,
}

impl ExtractionQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues every unique URL of a dedup report.
    #[must_use]
    pub fn from_report(report: &DedupReport) -> Self {
        let mut queue = Self::new();
        queue.enqueue_all(report.deduplicated_urls.iter().cloned());
        queue
    }

    /// Queues a URL unless it has been queued before. Returns whether it was added.
    pub fn enqueue(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.pending.push_back(url);
        true
    }

    /// Queues several URLs. Returns how many were added.
    pub fn enqueue_all<I, S>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = 0;
        for url in urls {
            if self.enqueue(url) {
                added += 1;
            }
        }
        added
    }

    /// URLs still waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Whether the URL has ever been queued.
    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    /// Extracts every waiting URL, one at a time, in queue order.
    pub async fn drain<E: ArticleExtractor + ?Sized>(&mut self, extractor: &E) -> ExtractionOutcome {
        let mut outcome = ExtractionOutcome::default();

        while let Some(url) = self.pending.pop_front() {
            match extractor.extract(&url).await {
                Ok(article) => {
                    tracing::debug!(url = %url, "Extracted article");
                    outcome.extracted.push(article);
                }
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Could not extract article");
                    outcome.failed.push(FailedExtraction {
                        url,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            extracted = outcome.extracted.len(),
            failed = outcome.failed.len(),
            "Drained extraction queue"
        );
        outcome
    }
}
