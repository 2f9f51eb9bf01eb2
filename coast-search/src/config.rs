//! Run configuration.
//!
//! A daily search is driven by two JSON files: the run config (dates,
//! dimension word lists, limits, output locations) and the API details file
//! listing the search engines to bind to segments.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::binding::Credential;
use crate::errors::{ConfigurationError, Result};
use crate::segments::DEFAULT_MAX_ATTEMPTS;
use crate::validation::DEFAULT_MAX_WORDS;

/// Date format used by `start_date`.
pub const START_DATE_FORMAT: &str = "%d-%m-%Y";
/// Results returned per provider page.
pub const RESULTS_PER_PAGE: u32 = 10;
/// Deepest result the provider will page to.
pub const MAX_RESULTS: u32 = 100;

/// Retry configuration for failed requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts.
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    /// Initial delay between retries in seconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_seconds: f64,
    /// Backoff multiplier.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Maximum delay between retries.
    #[serde(default = "default_max_delay")]
    pub max_delay_seconds: f64,
    /// Status codes that should trigger a retry.
    #[serde(default = "default_retry_status_codes")]
    pub retry_status_codes: HashSet<u16>,
}

fn default_max_retries() -> usize {
    2
}

fn default_retry_delay() -> f64 {
    1.0
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_max_delay() -> f64 {
    30.0
}

fn default_retry_status_codes() -> HashSet<u16> {
    [429, 500, 502, 503, 504].into_iter().collect()
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_seconds: default_retry_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            max_delay_seconds: default_max_delay(),
            retry_status_codes: default_retry_status_codes(),
        }
    }
}

impl RetryConfig {
    /// Disables retries.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Calculates the delay for a given attempt.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let delay = self.retry_delay_seconds * self.backoff_multiplier.powi(exponent);
        Duration::from_secs_f64(delay.min(self.max_delay_seconds).max(0.0))
    }

    /// Whether a status code should trigger a retry.
    #[must_use]
    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_status_codes.contains(&status)
    }
}

/// Configuration for one daily search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// First day of the study, `DD-MM-YYYY`.
    pub start_date: String,
    /// One word-list file per dimension, in dimension order.
    pub dimension_files: Vec<PathBuf>,
    /// Seed phrase for segment 1.
    #[serde(default = "default_seed")]
    pub seed: String,
    /// Provider word limit.
    #[serde(default = "default_key_max")]
    pub key_max: usize,
    /// Repeats of every segment per day.
    #[serde(default = "default_number_of_runs")]
    pub number_of_runs: u32,
    /// Results fetched per run, in pages of ten.
    #[serde(default = "default_number_of_results")]
    pub number_of_results: u32,
    /// JSON file holding the search engine credentials.
    pub api_details_file: PathBuf,
    /// Directory for per-result backup files.
    #[serde(default)]
    pub search_backup_dir: Option<PathBuf>,
    /// Optional vocabulary file for the random phrase.
    #[serde(default)]
    pub vocabulary_file: Option<PathBuf>,
    /// Draws allowed when building the random phrase.
    #[serde(default = "default_random_phrase_attempts")]
    pub random_phrase_attempts: usize,
    /// Pause before every provider request, in seconds.
    #[serde(default = "default_request_delay")]
    pub request_delay_seconds: f64,
    /// Retry policy for provider requests.
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_seed() -> String {
    "software".to_string()
}

fn default_key_max() -> usize {
    DEFAULT_MAX_WORDS
}

fn default_number_of_runs() -> u32 {
    1
}

fn default_number_of_results() -> u32 {
    RESULTS_PER_PAGE
}

fn default_random_phrase_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

fn default_request_delay() -> f64 {
    1.0
}

impl RunConfig {
    /// Creates a config with defaults for everything but the required fields.
    #[must_use]
    pub fn new(
        start_date: impl Into<String>,
        dimension_files: Vec<PathBuf>,
        api_details_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            start_date: start_date.into(),
            dimension_files,
            seed: default_seed(),
            key_max: default_key_max(),
            number_of_runs: default_number_of_runs(),
            number_of_results: default_number_of_results(),
            api_details_file: api_details_file.into(),
            search_backup_dir: None,
            vocabulary_file: None,
            random_phrase_attempts: default_random_phrase_attempts(),
            request_delay_seconds: default_request_delay(),
            retry: RetryConfig::default(),
        }
    }

    /// Parses and validates a config from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            ConfigurationError::invalid_value("run config", e.to_string())
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Sets the seed phrase.
    #[must_use]
    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = seed.into();
        self
    }

    /// Sets runs per day and results per run.
    #[must_use]
    pub fn with_runs(mut self, number_of_runs: u32, number_of_results: u32) -> Self {
        self.number_of_runs = number_of_runs;
        self.number_of_results = number_of_results;
        self
    }

    /// Sets the backup directory.
    #[must_use]
    pub fn with_backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_backup_dir = Some(dir.into());
        self
    }

    /// Sets the request delay.
    #[must_use]
    pub fn with_request_delay(mut self, seconds: f64) -> Self {
        self.request_delay_seconds = seconds;
        self
    }

    /// Sets the retry policy for provider requests.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.start_date()?;

        if self.dimension_files.is_empty() {
            return Err(ConfigurationError::NoDimensions);
        }
        if self.seed.trim().is_empty() {
            return Err(ConfigurationError::invalid_value("seed", "must not be empty"));
        }
        if self.number_of_runs == 0 {
            return Err(ConfigurationError::invalid_value("number_of_runs", "must be at least 1"));
        }
        if self.number_of_results == 0 || self.number_of_results > MAX_RESULTS {
            return Err(ConfigurationError::invalid_value(
                "number_of_results",
                format!("must be between 1 and {MAX_RESULTS}"),
            ));
        }
        if !self.request_delay_seconds.is_finite() || self.request_delay_seconds < 0.0 {
            return Err(ConfigurationError::invalid_value(
                "request_delay_seconds",
                "must be a non-negative number",
            ));
        }

        Ok(())
    }

    /// Parsed `start_date`.
    pub fn start_date(&self) -> Result<NaiveDate, ConfigurationError> {
        NaiveDate::parse_from_str(&self.start_date, START_DATE_FORMAT).map_err(|e| {
            ConfigurationError::invalid_value("start_date", format!("{e} (expected DD-MM-YYYY)"))
        })
    }

    /// Day of the study `today` falls on; the start date is day 1.
    pub fn day_number(&self, today: NaiveDate) -> Result<i64, ConfigurationError> {
        Ok((today - self.start_date()?).num_days() + 1)
    }

    /// Pause before every provider request.
    #[must_use]
    pub fn request_delay(&self) -> Duration {
        Duration::from_secs_f64(self.request_delay_seconds.max(0.0))
    }

    /// Provider pages requested per run.
    #[must_use]
    pub fn pages_per_run(&self) -> u32 {
        self.number_of_results.div_ceil(RESULTS_PER_PAGE)
    }

    /// Loads the API details file.
    pub fn load_api_config(&self) -> Result<ApiConfig> {
        ApiConfig::from_file(&self.api_details_file)
    }
}

/// The API details file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Search engines, shared or one per segment.
    pub search_engines: Vec<Credential>,
}

impl ApiConfig {
    /// Parses the API details from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ConfigurationError::invalid_value("api details", e.to_string()))?;
        if config.search_engines.is_empty() {
            return Err(
                ConfigurationError::invalid_value("search_engines", "at least one engine is required")
                    .into(),
            );
        }
        Ok(config)
    }

    /// Reads the API details file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}
