use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_OUTPUT_DIR: &str = "reports";
pub const DEFAULT_SUMMARY_FILE: &str = "summary";
pub const DEFAULT_BATCH_SIZE: usize = 10_000;
pub const UNLIMITED_ERRORED_RECORDS: i64 = -1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("at least one input file or directory is required")]
    NoInputs,
    #[error("at least one schema file is required")]
    NoSchemas,
    #[error("batch size must be at least 1, got {0}")]
    InvalidBatchSize(usize),
    #[error("max errored records must be -1 (unlimited) or >= 0, got {0}")]
    InvalidMaxErrored(i64),
    #[error("summary file name must not be empty")]
    EmptySummaryFile,
}

/// Everything a validation run needs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunConfig {
    #[serde(default)]
    pub inputs: Vec<PathBuf>,
    /// Schema documents in priority order; later ones override earlier ones.
    #[serde(default)]
    pub schemas: Vec<PathBuf>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_summary_file")]
    pub summary_file: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_errored")]
    pub max_errored_records: i64,
    #[serde(default)]
    pub workflow: Option<String>,
    /// Also write records without errors to the detail output.
    #[serde(default)]
    pub include_valid_records: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_summary_file() -> String {
    DEFAULT_SUMMARY_FILE.to_string()
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_max_errored() -> i64 {
    UNLIMITED_ERRORED_RECORDS
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            schemas: Vec::new(),
            output_dir: default_output_dir(),
            summary_file: default_summary_file(),
            batch_size: default_batch_size(),
            max_errored_records: default_max_errored(),
            workflow: None,
            include_valid_records: false,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inputs.is_empty() {
            return Err(ConfigError::NoInputs);
        }
        if self.schemas.is_empty() {
            return Err(ConfigError::NoSchemas);
        }
        if self.batch_size < 1 {
            return Err(ConfigError::InvalidBatchSize(self.batch_size));
        }
        if self.max_errored_records < UNLIMITED_ERRORED_RECORDS {
            return Err(ConfigError::InvalidMaxErrored(self.max_errored_records));
        }
        if self.summary_file.trim().is_empty() {
            return Err(ConfigError::EmptySummaryFile);
        }
        Ok(())
    }

    pub fn error_cap(&self) -> ErrorCap {
        ErrorCap::from(self.max_errored_records)
    }
}

/// How many errored records a single file may write to its detail output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCap {
    Unlimited,
    AtMost(u64),
}

impl ErrorCap {
    /// `nth` is the 1-based position of an errored record within its file.
    pub fn admits(self, nth: u64) -> bool {
        match self {
            ErrorCap::Unlimited => true,
            ErrorCap::AtMost(max) => nth <= max,
        }
    }
}

impl From<i64> for ErrorCap {
    fn from(v: i64) -> Self {
        if v < 0 {
            ErrorCap::Unlimited
        } else {
            ErrorCap::AtMost(v as u64)
        }
    }
}
