use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use recqa_core::config::load::load_run_config;
use recqa_core::config::models::RunConfig;
use recqa_core::schema::merge::merge_schema_files;
use recqa_core::WorkflowRegistry;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "recqa", version, about = "Validate CSV/JSON record files against JSON schemas")]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate input files and write detail and summary reports.
    ///
    /// With several schemas the later ones are merged into the earlier ones
    /// using JSON Merge Patch.
    Validate {
        /// Input files or directories (searched recursively).
        inputs: Vec<PathBuf>,
        /// Schema file (JSON or YAML); repeat to merge, later ones override.
        #[arg(short = 's', long = "schema")]
        schemas: Vec<PathBuf>,
        /// Reports output directory [default: reports].
        #[arg(short = 'o', long)]
        output_dir: Option<PathBuf>,
        /// Name of the overall summary file, without extension [default: summary].
        #[arg(short = 'y', long)]
        summary_file: Option<String>,
        /// Records per batch [default: 10000].
        #[arg(short = 'b', long)]
        batch_size: Option<usize>,
        /// Max errored records kept in each detail file; -1 means no limit [default: -1].
        #[arg(short = 'm', long = "max", allow_negative_numbers = true)]
        max_errored_records: Option<i64>,
        /// Workflow to run on each record and summary.
        #[arg(short = 'w', long)]
        workflow: Option<String>,
        /// Also write records without errors to the detail files.
        #[arg(long)]
        include_valid: bool,
        /// Run config file (YAML or JSON); flags extend or override it.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Merge schema files and print the result.
    MergeSchemas {
        #[arg(short = 's', long = "schema", required = true)]
        schemas: Vec<PathBuf>,
        /// Write the merged schema here instead of stdout.
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Validate {
            inputs,
            schemas,
            output_dir,
            summary_file,
            batch_size,
            max_errored_records,
            workflow,
            include_valid,
            config,
        } => {
            let mut run_config = match config {
                Some(p) => load_run_config(&p)?,
                None => RunConfig::default(),
            };
            run_config.inputs.extend(inputs);
            run_config.schemas.extend(schemas);
            if let Some(v) = output_dir {
                run_config.output_dir = v;
            }
            if let Some(v) = summary_file {
                run_config.summary_file = v;
            }
            if let Some(v) = batch_size {
                run_config.batch_size = v;
            }
            if let Some(v) = max_errored_records {
                run_config.max_errored_records = v;
            }
            if workflow.is_some() {
                run_config.workflow = workflow;
            }
            run_config.include_valid_records |= include_valid;

            let workflows = WorkflowRegistry::new();
            let summary = recqa_core::run(&run_config, &workflows).context("aborting validation")?;
            println!(
                "Done validating {} file(s). Reports are in {}",
                summary.len(),
                run_config.output_dir.display()
            );
        }
        Commands::MergeSchemas { schemas, output } => {
            let merged = merge_schema_files(&schemas)?;
            let pretty = serde_json::to_string_pretty(&merged.document)?;
            tracing::info!(sha256 = %merged.digest()?, "merged schema");
            match output {
                Some(p) => {
                    std::fs::write(&p, pretty).with_context(|| format!("write {}", p.display()))?;
                    println!("Merged schema written to {}", p.display());
                }
                None => println!("{pretty}"),
            }
        }
    }

    Ok(())
}
