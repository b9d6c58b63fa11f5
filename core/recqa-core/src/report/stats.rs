//! Per-file error statistics.
//!
//! Counts are bumped cheaply while records stream through; the file's total
//! record count is only known once streaming ends, so it is set in one pass
//! by [`ErrorStats::finalize`]. The percentage is never stored: it is derived
//! from the current count and total whenever it is read or serialized.

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::records::SchemaError;

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorStat {
    pub field: String,
    pub error_type: String,
    /// Description of the first occurrence.
    pub error_description: String,
    pub error_count: u64,
    pub record_count: u64,
}

impl ErrorStat {
    pub fn new(field: &str, error_type: &str, description: &str) -> Self {
        Self {
            field: field.to_string(),
            error_type: error_type.to_string(),
            error_description: description.to_string(),
            error_count: 1,
            record_count: 0,
        }
    }

    pub fn inc_err_count(&mut self) {
        self.error_count += 1;
    }

    /// `error_count / record_count * 100`, or `0.0` before the total is known.
    pub fn error_percent(&self) -> f64 {
        if self.record_count == 0 {
            return 0.0;
        }
        self.error_count as f64 / self.record_count as f64 * 100.0
    }
}

impl Serialize for ErrorStat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ErrorStat", 6)?;
        s.serialize_field("field", &self.field)?;
        s.serialize_field("error_type", &self.error_type)?;
        s.serialize_field("error_description", &self.error_description)?;
        s.serialize_field("error_count", &self.error_count)?;
        s.serialize_field("record_count", &self.record_count)?;
        s.serialize_field("error_percent", &self.error_percent())?;
        s.end()
    }
}

/// `"<field>.<error_type>"` to stat, for one input file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ErrorStats(BTreeMap<String, ErrorStat>);

/// Input file base name to that file's stats.
pub type RunSummary = BTreeMap<String, ErrorStats>;

impl ErrorStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, field: &str, error_type: &str, description: &str) {
        let key = format!("{field}.{error_type}");
        match self.0.get_mut(&key) {
            Some(stat) => stat.inc_err_count(),
            None => {
                self.0.insert(key, ErrorStat::new(field, error_type, description));
            }
        }
    }

    pub fn record_error(&mut self, e: &SchemaError) {
        self.record(&e.field, &e.error_type, &e.description);
    }

    /// Set the file's final record count on every entry.
    pub fn finalize(&mut self, total_records: u64) {
        for stat in self.0.values_mut() {
            stat.record_count = total_records;
        }
    }

    pub fn get(&self, key: &str) -> Option<&ErrorStat> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ErrorStat> {
        self.0.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ErrorStat> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_occurrence_creates_then_increments() {
        let mut s = ErrorStats::new();
        s.record("price", "type", "first");
        s.record("price", "type", "second");
        s.record("name", "required", "missing");
        assert_eq!(s.len(), 2);
        let price = s.get("price.type").expect("price stat");
        assert_eq!(price.error_count, 2);
        assert_eq!(price.error_description, "first");
        assert_eq!(price.record_count, 0);
        assert_eq!(price.error_percent(), 0.0);
    }

    #[test]
    fn percent_follows_count_and_total() {
        let mut s = ErrorStats::new();
        for _ in 0..3 {
            s.record("a", "type", "d");
        }
        s.finalize(12);
        assert_eq!(s.get("a.type").map(ErrorStat::error_percent), Some(25.0));

        // A later count change is reflected without another finalize.
        s.get_mut("a.type").expect("stat").inc_err_count();
        assert!((s.get("a.type").expect("stat").error_percent() - 4.0 / 12.0 * 100.0).abs() < 1e-12);
    }

    #[test]
    fn serializes_with_report_field_names() -> anyhow::Result<()> {
        let mut s = ErrorStats::new();
        s.record("id", "type", "bad id");
        s.finalize(4);
        let v = serde_json::to_value(&s)?;
        assert_eq!(
            v,
            json!({
                "id.type": {
                    "field": "id",
                    "error_type": "type",
                    "error_description": "bad id",
                    "error_count": 1,
                    "record_count": 4,
                    "error_percent": 25.0
                }
            })
        );
        Ok(())
    }

    #[test]
    fn keys_serialize_sorted() -> anyhow::Result<()> {
        let mut s = ErrorStats::new();
        s.record("z", "type", "");
        s.record("a", "type", "");
        let out = serde_json::to_string(&s)?;
        assert!(out.find("a.type") < out.find("z.type"));
        Ok(())
    }
}
