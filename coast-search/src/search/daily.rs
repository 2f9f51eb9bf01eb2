//! The daily search job.
//!
//! Loads the dimensions, plans the day's queries with a fresh random phrase,
//! binds them to credentials and runs them, storing results under the day
//! number counted from the study's start date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::protocols::SearchClient;
use super::runner::{RunSummary, SearchRunner};
use super::sink::{JsonFileSink, MemorySink, ResultSink, TeeSink};
use crate::binding::merge;
use crate::config::RunConfig;
use crate::dimensions::load_dimensions;
use crate::errors::Result;
use crate::observability::WideEventEmitter;
use crate::segments::{
    QueryPlanner, RandomPhraseGenerator, SegmentPlan, VocabularyWordSource, WordSource,
};

/// What a daily run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    /// Study day.
    pub day: i64,
    /// The day's query plan.
    pub plan: SegmentPlan,
    /// Execution summary.
    pub summary: RunSummary,
}

/// Word source configured by `vocabulary_file`, or the built-in vocabulary.
pub fn word_source_for(config: &RunConfig) -> Result<VocabularyWordSource> {
    match &config.vocabulary_file {
        Some(path) => VocabularyWordSource::from_file(path),
        None => Ok(VocabularyWordSource::builtin()),
    }
}

/// Plans the day's queries from the configured dimension files.
pub fn plan_day<W: WordSource + ?Sized>(config: &RunConfig, words: &mut W) -> Result<SegmentPlan> {
    let dimensions = load_dimensions(&config.dimension_files)?;
    QueryPlanner::new()
        .with_seed(config.seed.clone())
        .with_max_words(config.key_max)
        .with_phrase_generator(
            RandomPhraseGenerator::new().with_max_attempts(config.random_phrase_attempts),
        )
        .plan(&dimensions, words)
}

/// Runs one day of searches.
pub async fn run_daily_search<C, W>(
    config: &RunConfig,
    today: NaiveDate,
    client: C,
    words: &mut W,
    sink: &mut dyn ResultSink,
) -> Result<DailyReport>
where
    C: SearchClient,
    W: WordSource + ?Sized,
{
    config.validate()?;
    let day = config.day_number(today)?;

    let plan = plan_day(config, words)?;
    let api = config.load_api_config()?;
    let bound = merge(plan.segments.clone(), &api.search_engines)?;

    tracing::info!(
        day,
        segments = bound.len(),
        fingerprint = %plan.fingerprint(),
        random_phrase = %plan.random_phrase,
        "Planned daily search"
    );

    let summary = SearchRunner::from_config(client, config)
        .run(day, &bound, sink)
        .await?;

    let report = DailyReport { day, plan, summary };
    WideEventEmitter::new().emit_run_event(&report);
    Ok(report)
}

/// Runs one day of searches into memory.
///
/// When `search_backup_dir` is set every result is also written there.
pub async fn run_daily_search_to_memory<C: SearchClient>(
    config: &RunConfig,
    today: NaiveDate,
    client: C,
) -> Result<(DailyReport, MemorySink)> {
    let mut words = word_source_for(config)?;
    match &config.search_backup_dir {
        Some(dir) => {
            let mut tee = TeeSink::new(MemorySink::new(), JsonFileSink::new(dir));
            let report = run_daily_search(config, today, client, &mut words, &mut tee).await?;
            let (memory, _) = tee.into_parts();
            Ok((report, memory))
        }
        None => {
            let mut memory = MemorySink::new();
            let report = run_daily_search(config, today, client, &mut words, &mut memory).await?;
            Ok((report, memory))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{CoastError, ConfigurationError};
    use crate::testing::{write_study_files, FixedWordSource, ScriptedSearchClient};
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 3, 3).unwrap()
    }

    #[tokio::test]
    async fn test_daily_run_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_study_files(dir.path(), 1).unwrap().with_request_delay(0.0);
        let mut words = FixedWordSource::new(["annexs", "mug", "regions"]);
        let mut sink = MemorySink::new();

        let report = run_daily_search(
            &config,
            today(),
            ScriptedSearchClient::echo(),
            &mut words,
            &mut sink,
        )
        .await
        .unwrap();

        assert_eq!(report.day, 3);
        assert_eq!(report.plan.len(), 9);
        assert_eq!(report.plan.random_phrase, "annexs mug regions");
        assert_eq!(report.summary.stored, 9);
        assert!(report.summary.is_complete());
        assert!(sink.results(3)[0]
            .query_string
            .starts_with("\"annexs mug regions\" -\""));
    }

    #[tokio::test]
    async fn test_shared_credential_is_used_for_every_segment() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_study_files(dir.path(), 1).unwrap().with_request_delay(0.0);
        let client = ScriptedSearchClient::echo();
        let mut words = FixedWordSource::new(["annexs", "mug", "regions"]);
        let mut sink = MemorySink::new();

        run_daily_search(&config, today(), client, &mut words, &mut sink)
            .await
            .unwrap();

        assert!(sink
            .results(3)
            .iter()
            .all(|r| r.api_info.search_engine_id == "cx0"));
    }

    #[tokio::test]
    async fn test_credential_count_mismatch_fails_before_searching() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_study_files(dir.path(), 2).unwrap().with_request_delay(0.0);
        let mut words = FixedWordSource::new(["annexs", "mug", "regions"]);
        let mut sink = MemorySink::new();

        let err = run_daily_search(
            &config,
            today(),
            ScriptedSearchClient::echo(),
            &mut words,
            &mut sink,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            CoastError::Configuration(ConfigurationError::CredentialCount {
                credentials: 2,
                segments: 9
            })
        ));
        assert_eq!(sink.stored(3), 0);
    }

    #[tokio::test]
    async fn test_backup_directory_receives_copies() {
        let dir = tempfile::tempdir().unwrap();
        let backup = dir.path().join("backup");
        let config = write_study_files(dir.path(), 1)
            .unwrap()
            .with_request_delay(0.0)
            .with_backup_dir(&backup);

        let (report, memory) =
            run_daily_search_to_memory(&config, today(), ScriptedSearchClient::echo())
                .await
                .unwrap();

        assert_eq!(memory.stored(report.day), 9);
        let files = std::fs::read_dir(backup.join("day_3")).unwrap().count();
        assert_eq!(files, 9);
    }

    #[test]
    fn test_word_source_defaults_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_study_files(dir.path(), 1).unwrap();
        assert!(!word_source_for(&config).unwrap().is_empty());
    }
}
