use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use super::stats::{ErrorStats, RunSummary};
use crate::records::{SchemaError, ValidatedRecord};

const DETAILS_DIR: &str = "details";
const SUMMARY_DIR: &str = "summary";

/// One entry of a detail file.
#[derive(Debug, Serialize)]
pub struct RecordWrapper<'a> {
    pub errors: &'a [SchemaError],
    pub record: Map<String, Value>,
}

impl<'a> RecordWrapper<'a> {
    pub fn new(validated: &'a ValidatedRecord, include_collection: bool) -> Self {
        Self {
            errors: &validated.errors,
            record: validated.record.payload(include_collection),
        }
    }
}

/// Where a run's reports go under the output root.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the output root and its `details/` and `summary/` directories.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.root.clone(), self.details_dir(), self.summary_dir()] {
            fs::create_dir_all(&dir).with_context(|| format!("create output dir {}", dir.display()))?;
        }
        Ok(())
    }

    pub fn details_dir(&self) -> PathBuf {
        self.root.join(DETAILS_DIR)
    }

    pub fn summary_dir(&self) -> PathBuf {
        self.root.join(SUMMARY_DIR)
    }

    pub fn detail_path(&self, base_name: &str) -> PathBuf {
        self.details_dir().join(format!("{base_name}.json"))
    }

    pub fn file_summary_path(&self, base_name: &str) -> PathBuf {
        self.summary_dir().join(format!("{base_name}.json"))
    }

    pub fn run_summary_path(&self, summary_file: &str) -> PathBuf {
        self.root.join(format!("{summary_file}.json"))
    }

    pub fn write_file_summary(&self, base_name: &str, stats: &ErrorStats) -> Result<PathBuf> {
        let path = self.file_summary_path(base_name);
        write_pretty(&path, stats)?;
        Ok(path)
    }

    pub fn write_run_summary(&self, summary_file: &str, summary: &RunSummary) -> Result<PathBuf> {
        let path = self.run_summary_path(summary_file);
        write_pretty(&path, summary)?;
        Ok(path)
    }
}

fn write_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_vec_pretty(value)?;
    fs::write(path, data).with_context(|| format!("write {}", path.display()))
}
