//! Persistence targets for search results.
//!
//! Results are grouped by study day. [`JsonFileSink`] writes one pretty-printed
//! document per result under `<dir>/day_<n>/`.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::errors::Result;
use crate::results::{RunCollection, SegmentResult};

/// Protocol for result persistence.
pub trait ResultSink: Send {
    /// Stores one result for the given day.
    fn store(&mut self, day: i64, result: &SegmentResult) -> Result<()>;

    /// Number of results stored for the day through this sink.
    fn stored(&self, day: i64) -> usize;
}

/// Keeps results in memory, grouped by day.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    by_day: BTreeMap<i64, Vec<SegmentResult>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Results stored for the day, in store order.
    #[must_use]
    pub fn results(&self, day: i64) -> &[SegmentResult] {
        self.by_day.get(&day).map_or(&[], Vec::as_slice)
    }

    /// The day's results as a single-run collection.
    #[must_use]
    pub fn collection(&self, day: i64) -> RunCollection {
        RunCollection::single(self.results(day).to_vec())
    }

    /// Days that have at least one result.
    pub fn days(&self) -> impl Iterator<Item = i64> + '_ {
        self.by_day.keys().copied()
    }
}

impl ResultSink for MemorySink {
    fn store(&mut self, day: i64, result: &SegmentResult) -> Result<()> {
        self.by_day.entry(day).or_default().push(result.clone());
        Ok(())
    }

    fn stored(&self, day: i64) -> usize {
        self.results(day).len()
    }
}

/// Writes each result as a JSON file under `<dir>/day_<n>/<uuid>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    root: PathBuf,
    written: HashMap<i64, usize>,
}

impl JsonFileSink {
    /// Creates a sink rooted at `root`. Directories are created on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            written: HashMap::new(),
        }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding a day's files.
    #[must_use]
    pub fn day_dir(&self, day: i64) -> PathBuf {
        self.root.join(format!("day_{day}"))
    }

    /// Reads every stored file for the day back into a single-run collection.
    ///
    /// Files are read in name order.
    pub fn load_day(&self, day: i64) -> Result<RunCollection> {
        let dir = self.day_dir(day);
        if !dir.exists() {
            return Ok(RunCollection::default());
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut run = Vec::with_capacity(paths.len());
        for path in paths {
            let text = fs::read_to_string(&path)?;
            run.push(serde_json::from_str(&text)?);
        }
        Ok(RunCollection::single(run))
    }
}

impl ResultSink for JsonFileSink {
    fn store(&mut self, day: i64, result: &SegmentResult) -> Result<()> {
        let dir = self.day_dir(day);
        fs::create_dir_all(&dir)?;

        let path = dir.join(format!("{}.json", Uuid::new_v4()));
        fs::write(&path, serde_json::to_string_pretty(result)?)?;
        *self.written.entry(day).or_default() += 1;

        tracing::debug!(
            day,
            segment_id = result.segment_id,
            path = %path.display(),
            "Stored search result"
        );
        Ok(())
    }

    fn stored(&self, day: i64) -> usize {
        self.written.get(&day).copied().unwrap_or(0)
    }
}

/// Writes to a backup sink first, then to the primary.
///
/// Counts are reported from the primary.
#[derive(Debug, Clone, Default)]
pub struct TeeSink<P, B> {
    primary: P,
    backup: B,
}

impl<P: ResultSink, B: ResultSink> TeeSink<P, B> {
    /// Creates a new tee.
    #[must_use]
    pub const fn new(primary: P, backup: B) -> Self {
        Self { primary, backup }
    }

    /// Splits the tee back into `(primary, backup)`.
    pub fn into_parts(self) -> (P, B) {
        (self.primary, self.backup)
    }
}

impl<P: ResultSink, B: ResultSink> ResultSink for TeeSink<P, B> {
    fn store(&mut self, day: i64, result: &SegmentResult) -> Result<()> {
        self.backup.store(day, result)?;
        self.primary.store(day, result)
    }

    fn stored(&self, day: i64) -> usize {
        self.primary.stored(day)
    }
}

impl<S: ResultSink + ?Sized> ResultSink for Box<S> {
    fn store(&mut self, day: i64, result: &SegmentResult) -> Result<()> {
        (**self).store(day, result)
    }

    fn stored(&self, day: i64) -> usize {
        (**self).stored(day)
    }
}
