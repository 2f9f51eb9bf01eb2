//! Search execution.
//!
//! This module provides:
//! - The provider client and observer protocols
//! - A runner that pages through results for every bound segment
//! - Result sinks grouped by study day
//! - The daily search job
//! - A Google Custom Search client (feature `google`)

mod daily;
#[cfg(feature = "google")]
mod google;
mod protocols;
mod runner;
mod sink;

pub use daily::{plan_day, run_daily_search, run_daily_search_to_memory, word_source_for, DailyReport};
#[cfg(feature = "google")]
pub use google::{GoogleSearchClient, DEFAULT_ENDPOINT};
pub use protocols::{
    LoggingSearchObserver, NoOpSearchObserver, SearchClient, SearchObserver, SearchRequest,
};
pub use runner::{RunSummary, SearchRunner};
pub use sink::{JsonFileSink, MemorySink, ResultSink, TeeSink};
