use super::models::RunConfig;
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// True for `.yaml` / `.yml` paths.
pub fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
}

pub fn read_json(path: &Path) -> Result<Value> {
    let s = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let v: Value = serde_json::from_str(&s).with_context(|| format!("parsing {}", path.display()))?;
    Ok(v)
}

fn read_yaml(path: &Path) -> Result<Value> {
    let s = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let v: Value = serde_yaml::from_str(&s).with_context(|| format!("parsing {}", path.display()))?;
    Ok(v)
}

/// Load a run configuration from a YAML or JSON file.
///
/// Relative input, schema and output paths are kept as written; they resolve
/// against the process working directory like the equivalent CLI flags.
pub fn load_run_config(path: &Path) -> Result<RunConfig> {
    let v = if is_yaml(path) { read_yaml(path)? } else { read_json(path)? };
    serde_json::from_value(v).with_context(|| format!("invalid run config {}", path.display()))
}
