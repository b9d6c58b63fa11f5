//! Streaming JSON Schema validation for bulk CSV/JSON record files.
//!
//! Records are read in bounded batches, validated against a merged schema,
//! and reported as a per-file detail array plus aggregated error statistics.

pub mod config;
pub mod engine;
pub mod records;
pub mod report;
pub mod schema;
pub mod workflow;

pub use config::models::RunConfig;
pub use engine::run::run;
pub use report::stats::{ErrorStat, ErrorStats, RunSummary};
pub use workflow::{NoopWorkflow, Workflow, WorkflowRegistry};
