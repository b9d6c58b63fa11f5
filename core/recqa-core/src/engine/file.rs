//! Validation of a single input file.
//!
//! A file moves through `open` → `process_batch`* → `close` → `summarize`.
//! All per-file state (stats, counters, detail writer) lives here and is
//! dropped once the summary is handed back.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::models::ErrorCap;
use crate::records::{InputFormat, Record};
use crate::report::output::{OutputLayout, RecordWrapper};
use crate::report::stats::ErrorStats;
use crate::report::writer::JsonArrayWriter;
use crate::schema::registry::SchemaRegistry;
use crate::schema::validate::validate_batch;
use crate::workflow::{Vars, Workflow};

#[derive(Debug, Clone, Copy)]
pub struct FileOptions {
    pub error_cap: ErrorCap,
    pub include_valid_records: bool,
}

/// Running totals for one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileCounters {
    pub records: u64,
    pub records_with_errors: u64,
    pub batches: u64,
}

pub struct FileValidator {
    path: PathBuf,
    base_name: String,
    include_collection: bool,
    options: FileOptions,
    stats: ErrorStats,
    counters: FileCounters,
    detail: JsonArrayWriter<BufWriter<File>>,
}

impl FileValidator {
    /// Start the detail output for `path` and reset the per-file state.
    pub fn open(
        path: &Path,
        base_name: &str,
        format: InputFormat,
        layout: &OutputLayout,
        options: FileOptions,
    ) -> Result<Self> {
        let detail_path = layout.detail_path(base_name);
        let detail = JsonArrayWriter::create(&detail_path)
            .with_context(|| format!("initializing detail output for {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            base_name: base_name.to_string(),
            include_collection: format.carries_collections(),
            options,
            stats: ErrorStats::new(),
            counters: FileCounters::default(),
            detail,
        })
    }

    /// Validate one batch, run the record hook, update stats and write detail entries.
    pub fn process_batch(
        &mut self,
        batch: Vec<Record>,
        registry: &mut SchemaRegistry,
        workflow: &mut dyn Workflow,
        vars: &mut Vars,
    ) -> Result<()> {
        for rec in &batch {
            registry.observe(&rec.collection);
        }

        for group in validate_batch(registry, batch) {
            let mut records = group.records;
            for rec in records.iter_mut() {
                workflow
                    .exec_record(rec, vars)
                    .with_context(|| format!("workflow record hook failed in {}", self.path.display()))?;
            }

            self.counters.records += records.len() as u64;
            for rec in &records {
                if rec.has_errors() {
                    self.counters.records_with_errors += 1;
                    for e in &rec.errors {
                        self.stats.record_error(e);
                    }
                    if !self.options.error_cap.admits(self.counters.records_with_errors) {
                        continue;
                    }
                } else if !self.options.include_valid_records {
                    continue;
                }
                self.detail.write_item(&RecordWrapper::new(rec, self.include_collection))?;
            }
        }

        self.counters.batches += 1;
        debug!(
            file = %self.base_name,
            batch = self.counters.batches,
            records = self.counters.records,
            with_errors = self.counters.records_with_errors,
            "batch validated"
        );
        Ok(())
    }

    /// Close the detail array, run the summary hook, fix up totals and
    /// persist the per-file summary. Returns the file's final stats.
    pub fn finish(self, layout: &OutputLayout, workflow: &mut dyn Workflow, vars: &mut Vars) -> Result<ErrorStats> {
        let FileValidator { path, base_name, mut stats, counters, detail, .. } = self;

        let written = detail.items_written();
        detail
            .finish()
            .with_context(|| format!("closing detail output for {}", path.display()))?;

        workflow
            .exec_summary(vars, &mut stats)
            .with_context(|| format!("workflow summary hook failed for {}", path.display()))?;

        stats.finalize(counters.records);
        layout
            .write_file_summary(&base_name, &stats)
            .with_context(|| format!("writing summary for {}", path.display()))?;

        info!(
            file = %base_name,
            records = counters.records,
            with_errors = counters.records_with_errors,
            written,
            error_kinds = stats.len(),
            "file validated"
        );
        Ok(stats)
    }
}
