//! # Coast Search
//!
//! Generates partitioned keyword queries for a longitudinal web search study
//! and processes what the searches return.
//!
//! Given a set of named keyword dimensions, the crate produces one query per
//! cell of the partition of the keyword space (every non-empty subset of
//! dimensions, each required while the rest are excluded), plus a random
//! baseline and a seed baseline. It also provides:
//!
//! - **Query validation**: total word count against the provider limit
//! - **Credential binding**: one shared engine or one engine per segment
//! - **Search execution**: paged provider requests with per-day result sinks
//! - **Result processing**: flattening stored runs and cross-segment URL deduplication
//! - **Extraction queue**: each deduplicated URL handed to an extractor once
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use coast_search::prelude::*;
//!
//! let dimensions = load_dimensions(&["topic.txt", "reasoning.txt", "experience.txt"])?;
//! let mut words = VocabularyWordSource::builtin();
//! let plan = plan_queries(&dimensions, "software", 32, &mut words)?;
//!
//! let engines = ApiConfig::from_file("api.json")?;
//! let bound = merge(plan.segments, &engines.search_engines)?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod binding;
pub mod config;
pub mod dimensions;
pub mod errors;
pub mod extraction;
pub mod observability;
pub mod results;
pub mod search;
pub mod segments;
pub mod testing;
pub mod validation;

pub use errors::{CoastError, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::binding::{merge, BoundSegment, Credential};
    pub use crate::config::{ApiConfig, RetryConfig, RunConfig};
    pub use crate::dimensions::{load_dimension_file, load_dimensions, Dimension};
    pub use crate::errors::{
        CoastError, ConfigurationError, MalformedInputError, Result, VocabularyExhaustionError,
    };
    pub use crate::extraction::{Article, ArticleExtractor, ExtractionOutcome, ExtractionQueue};
    pub use crate::observability::{init_tracing, LogFormat};
    pub use crate::results::{
        deduplicate, flatten, DedupReport, LinkCollection, ResultRecord, RunCollection,
        SegmentResult,
    };
    pub use crate::search::{
        run_daily_search, MemorySink, ResultSink, RunSummary, SearchClient, SearchRunner,
    };
    pub use crate::segments::{
        generate, plan_queries, DimensionClauses, QueryPlanner, Segment, SegmentPlan,
        VocabularyWordSource, WordSource,
    };
    pub use crate::validation::{total_word_count, validate_query_length};
}
