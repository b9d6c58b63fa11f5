use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::load::is_yaml;

/// The result of merging every schema document of a run.
#[derive(Debug, Clone)]
pub struct MergedSchema {
    pub document: Value,
    /// Files that contributed, in merge order.
    pub sources: Vec<PathBuf>,
}

impl MergedSchema {
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.document)?)
    }

    /// Hex SHA-256 of the compact serialized document.
    pub fn digest(&self) -> Result<String> {
        let mut hasher = Sha256::new();
        hasher.update(self.to_vec()?);
        Ok(hex::encode(hasher.finalize()))
    }
}

/// Read one schema document. YAML files are converted to JSON; a YAML file
/// that does not convert yields `Ok(None)` so the caller can skip it.
pub fn read_schema_document(path: &Path) -> Result<Option<Value>> {
    let bytes = fs::read(path).with_context(|| format!("reading schema {}", path.display()))?;
    if is_yaml(path) {
        return match serde_yaml::from_slice::<Value>(&bytes) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot convert YAML schema to JSON, skipping");
                Ok(None)
            }
        };
    }
    let v = serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing schema json: {}", path.display()))?;
    Ok(Some(v))
}

/// Merge schema files left to right with JSON Merge Patch (RFC 7396).
///
/// The first loadable document is the base; each later document patches it,
/// so later files win on conflicting keys and `null` deletes a key.
pub fn merge_schema_files(paths: &[PathBuf]) -> Result<MergedSchema> {
    let mut merged: Option<Value> = None;
    let mut sources = Vec::new();

    for path in paths {
        let Some(doc) = read_schema_document(path)? else {
            continue;
        };
        match merged.as_mut() {
            None => merged = Some(doc),
            Some(base) => json_patch::merge(base, &doc),
        }
        sources.push(path.clone());
    }

    let document = merged.ok_or_else(|| anyhow!("no schema document could be loaded from {} file(s)", paths.len()))?;
    info!(schemas = sources.len(), "merged schema documents");
    Ok(MergedSchema { document, sources })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let p = dir.join(name);
        fs::write(&p, body).expect("write schema fixture");
        p
    }

    #[test]
    fn later_documents_override_earlier() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let a = write(dir.path(), "a.json", r#"{"a":{"type":"string"}}"#);
        let b = write(dir.path(), "b.json", r#"{"a":{"type":"number"}}"#);
        let m = merge_schema_files(&[a, b])?;
        assert_eq!(m.document, json!({"a": {"type": "number"}}));
        Ok(())
    }

    #[test]
    fn deep_merges_and_null_deletes() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let base = write(
            dir.path(),
            "base.json",
            r#"{"type":"object","properties":{"id":{"type":"string"},"price":{"type":"number"}},"required":["id"]}"#,
        );
        let patch = write(
            dir.path(),
            "patch.yaml",
            "properties:\n  price: null\n  name:\n    type: string\nrequired: [id, name]\n",
        );
        let m = merge_schema_files(&[base, patch])?;
        assert_eq!(
            m.document,
            json!({
                "type": "object",
                "properties": {"id": {"type": "string"}, "name": {"type": "string"}},
                "required": ["id", "name"]
            })
        );
        assert_eq!(m.sources.len(), 2);
        Ok(())
    }

    #[test]
    fn bad_yaml_is_skipped() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let bad = write(dir.path(), "bad.yml", "a: [unclosed\n");
        let good = write(dir.path(), "good.json", r#"{"type":"object"}"#);
        let m = merge_schema_files(&[bad, good.clone()])?;
        assert_eq!(m.document, json!({"type": "object"}));
        assert_eq!(m.sources, vec![good]);
        Ok(())
    }

    #[test]
    fn unreadable_or_invalid_json_is_fatal() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let good = write(dir.path(), "good.json", "{}");
        let bad = write(dir.path(), "bad.json", "{not json");
        assert!(merge_schema_files(&[good.clone(), bad]).is_err());
        assert!(merge_schema_files(&[good, dir.path().join("missing.json")]).is_err());
        Ok(())
    }

    #[test]
    fn nothing_loadable_is_fatal() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let bad = write(dir.path(), "bad.yaml", "a: [unclosed\n");
        assert!(merge_schema_files(&[bad]).is_err());
        Ok(())
    }

    #[test]
    fn digest_is_stable() -> Result<()> {
        let m = MergedSchema { document: json!({"a": 1}), sources: vec![] };
        assert_eq!(m.digest()?, m.digest()?);
        assert_eq!(m.digest()?.len(), 64);
        Ok(())
    }
}
