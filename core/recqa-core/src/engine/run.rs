use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, info_span, warn};

use super::file::{FileOptions, FileValidator};
use crate::config::models::RunConfig;
use crate::records::{self, resolve};
use crate::report::output::OutputLayout;
use crate::report::stats::RunSummary;
use crate::schema::merge::merge_schema_files;
use crate::schema::registry::SchemaRegistry;
use crate::schema::validate::CompiledSchema;
use crate::workflow::{Vars, WorkflowRegistry};

/// Validate every input of `config` and write the reports.
///
/// Files are processed in resolved order. Unsupported files are skipped with
/// a warning; any other failure aborts the run, leaving the outputs of files
/// already summarized in place. The run summary is written last.
pub fn run(config: &RunConfig, workflows: &WorkflowRegistry) -> Result<RunSummary> {
    config.validate()?;
    info!(
        inputs = config.inputs.len(),
        schemas = config.schemas.len(),
        output_dir = %config.output_dir.display(),
        "starting validation"
    );

    let files = resolve::resolve_inputs(&config.inputs);
    warn_on_colliding_names(&files);

    let merged = merge_schema_files(&config.schemas).context("merging schemas")?;
    info!(sha256 = %merged.digest()?, "schema ready");
    let default_schema = CompiledSchema::new(&merged.document).context("compiling merged schema")?;
    let mut registry = SchemaRegistry::new(default_schema);

    let layout = OutputLayout::new(&config.output_dir);
    layout.ensure_dirs()?;

    let mut workflow = workflows.get(config.workflow.as_deref())?;
    let mut vars = Vars::new();
    let options = FileOptions {
        error_cap: config.error_cap(),
        include_valid_records: config.include_valid_records,
    };

    let mut summary = RunSummary::new();
    for path in &files {
        let base_name = resolve::base_name(path);
        let _span = info_span!("file", name = %base_name).entered();
        let Some((format, _)) = records::detect_format(path) else {
            warn!(path = %path.display(), "not a .csv or .json file, skipping");
            continue;
        };
        info!(path = %path.display(), "validating");

        let mut file = FileValidator::open(path, &base_name, format, &layout, options)?;
        records::stream_file(path, config.batch_size, |batch| {
            file.process_batch(batch, &mut registry, workflow.as_mut(), &mut vars)
        })
        .with_context(|| format!("processing input file {}", path.display()))?;

        let stats = file.finish(&layout, workflow.as_mut(), &mut vars)?;
        summary.insert(base_name, stats);
    }

    let summary_path = layout.write_run_summary(&config.summary_file, &summary)?;
    info!(files = summary.len(), path = %summary_path.display(), "validation done");
    Ok(summary)
}

fn warn_on_colliding_names(files: &[PathBuf]) {
    let mut first_seen: HashMap<String, &Path> = HashMap::new();
    for f in files {
        let name = resolve::base_name(f);
        if let Some(prev) = first_seen.insert(name.clone(), f.as_path()) {
            warn!(
                name = %name,
                first = %prev.display(),
                second = %f.display(),
                "inputs share a base name, the later one's reports overwrite the earlier"
            );
        }
    }
}
