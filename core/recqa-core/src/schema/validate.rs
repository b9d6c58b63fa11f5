use anyhow::{anyhow, Result};
use jsonschema::error::ValidationErrorKind;
use jsonschema::{ValidationError, Validator};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

use super::registry::SchemaRegistry;
use crate::records::{Record, SchemaError, ValidatedRecord};

/// Field name reported for errors on the document root.
pub const ROOT_FIELD: &str = "(root)";

pub struct CompiledSchema {
    validator: Validator,
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema").finish_non_exhaustive()
    }
}

impl CompiledSchema {
    pub fn new(schema: &Value) -> Result<Self> {
        let validator = Validator::new(schema).map_err(|e| anyhow!("schema compile error: {e}"))?;
        Ok(Self { validator })
    }

    /// All violations of `instance`, in the order the validator reports them.
    /// Repeated (field, error_type) pairs are reported once.
    pub fn validate(&self, instance: &Value) -> Vec<SchemaError> {
        let Err(errors) = self.validator.validate(instance) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        errors
            .map(|e| to_schema_error(&e))
            .filter(|e| seen.insert((e.field.clone(), e.error_type.clone())))
            .collect()
    }
}

fn to_schema_error(e: &ValidationError<'_>) -> SchemaError {
    let mut segments: Vec<String> = pointer_segments(&e.instance_path.to_string());
    if let ValidationErrorKind::Required { property } = &e.kind {
        match property {
            Value::String(s) => segments.push(s.clone()),
            other => segments.push(other.to_string()),
        }
    }
    let field = if segments.is_empty() { ROOT_FIELD.to_string() } else { segments.join(".") };

    let error_type = pointer_segments(&e.schema_path.to_string())
        .pop()
        .unwrap_or_else(|| "invalid".to_string());

    SchemaError { field, error_type, description: e.to_string() }
}

fn pointer_segments(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect()
}

/// Validated records of one collection, in stream order.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionBatch {
    pub collection: String,
    pub records: Vec<ValidatedRecord>,
}

/// Validate a batch against the registry, grouping results by collection.
///
/// Groups appear in the order their collection first occurs in the batch;
/// records keep their relative order within a group. The registry is not
/// modified.
pub fn validate_batch(registry: &SchemaRegistry, batch: Vec<Record>) -> Vec<CollectionBatch> {
    let mut groups: Vec<CollectionBatch> = Vec::new();
    for record in batch {
        let errors = registry.resolve(&record.collection).validate(&record.to_value());
        let validated = ValidatedRecord { record, errors };
        match groups.iter_mut().find(|g| g.collection == validated.record.collection) {
            Some(g) => g.records.push(validated),
            None => groups.push(CollectionBatch {
                collection: validated.record.collection.clone(),
                records: vec![validated],
            }),
        }
    }
    groups
}
