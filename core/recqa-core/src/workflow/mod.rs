//! Optional hooks run on every validated record and on every file summary.

use anyhow::{anyhow, Result};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use crate::records::ValidatedRecord;
use crate::report::stats::ErrorStats;

/// Variables shared by workflow hooks for the whole run.
pub type Vars = HashMap<String, Value>;

/// Hooks around validation. Both default to doing nothing; an error from
/// either aborts the run.
pub trait Workflow {
    /// Called once per validated record, before it is counted or written.
    fn exec_record(&mut self, _record: &mut ValidatedRecord, _vars: &mut Vars) -> Result<()> {
        Ok(())
    }

    /// Called once per file after streaming, before the summary is persisted.
    fn exec_summary(&mut self, _vars: &mut Vars, _stats: &mut ErrorStats) -> Result<()> {
        Ok(())
    }
}

/// The workflow used when none is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopWorkflow;

impl Workflow for NoopWorkflow {}

type Factory = Box<dyn Fn() -> Box<dyn Workflow>>;

/// Named workflow constructors.
#[derive(Default)]
pub struct WorkflowRegistry {
    factories: BTreeMap<String, Factory>,
}

impl WorkflowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F, W>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> W + 'static,
        W: Workflow + 'static,
    {
        self.factories
            .insert(name.into(), Box::new(move || Box::new(factory()) as Box<dyn Workflow>));
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// No name (or an empty one) gives [`NoopWorkflow`]; an unknown name is an error.
    pub fn get(&self, name: Option<&str>) -> Result<Box<dyn Workflow>> {
        match name.map(str::trim) {
            None | Some("") => Ok(Box::new(NoopWorkflow)),
            Some(n) => self.factories.get(n).map(|f| f()).ok_or_else(|| {
                let known: Vec<&str> = self.names().collect();
                anyhow!("unknown workflow {n:?} (known: {})", if known.is_empty() { "none".to_string() } else { known.join(", ") })
            }),
        }
    }
}
