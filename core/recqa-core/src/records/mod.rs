//! Record stream reader: decodes CSV and JSON input files into [`Record`]s
//! and hands them to a callback in bounded batches.

pub mod compression;
pub mod csv;
pub mod json;
pub mod resolve;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use compression::Compression;

/// Field carrying the collection tag inside a record.
pub const COLLECTION_FIELD: &str = "_collection";

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Empty when the record belongs to no named collection.
    pub collection: String,
    pub data: Map<String, Value>,
}

impl Record {
    pub fn new(collection: impl Into<String>, data: Map<String, Value>) -> Self {
        Self { collection: collection.into(), data }
    }

    /// Build a record from a decoded object, taking the collection from its
    /// `_collection` field when that field is a string.
    pub fn from_object(mut data: Map<String, Value>) -> Self {
        let collection = match data.remove(COLLECTION_FIELD) {
            Some(Value::String(s)) => s,
            Some(other) => {
                data.insert(COLLECTION_FIELD.to_string(), other);
                String::new()
            }
            None => String::new(),
        };
        Self { collection, data }
    }

    /// The document handed to the schema validator.
    pub fn to_value(&self) -> Value {
        Value::Object(self.data.clone())
    }

    /// Output payload: the field map, with the collection tag re-attached
    /// only for formats that carry collections natively.
    pub fn payload(&self, include_collection: bool) -> Map<String, Value> {
        let mut out = self.data.clone();
        if !include_collection {
            out.remove(COLLECTION_FIELD);
        } else if !self.collection.is_empty() {
            out.insert(COLLECTION_FIELD.to_string(), Value::String(self.collection.clone()));
        }
        out
    }
}

/// One schema violation found on a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaError {
    pub field: String,
    pub error_type: String,
    pub description: String,
}

impl SchemaError {
    /// Aggregation key, `<field>.<error_type>`.
    pub fn key(&self) -> String {
        format!("{}.{}", self.field, self.error_type)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecord {
    pub record: Record,
    pub errors: Vec<SchemaError>,
}

impl ValidatedRecord {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    /// JSON inputs carry collections natively, so their payloads keep the tag.
    pub fn carries_collections(self) -> bool {
        matches!(self, InputFormat::Json)
    }
}

/// Work out the decoder for a path, looking through a compression suffix.
/// Returns `None` for unsupported extensions.
pub fn detect_format(path: &Path) -> Option<(InputFormat, Compression)> {
    let compression = Compression::from_path(path);
    let inner = match compression {
        Compression::None => path.to_path_buf(),
        _ => path.with_extension(""),
    };
    let format = match inner.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => InputFormat::Csv,
        Some(ext) if ext.eq_ignore_ascii_case("json") => InputFormat::Json,
        _ => return None,
    };
    Some((format, compression))
}

/// Stream `path` through `on_batch`, at most `batch_size` records at a time.
///
/// Batches are delivered in file order. An error from `on_batch` stops the
/// stream and is returned unchanged.
pub fn stream_file<F>(path: &Path, batch_size: usize, mut on_batch: F) -> Result<()>
where
    F: FnMut(Vec<Record>) -> Result<()>,
{
    if batch_size == 0 {
        return Err(anyhow!("batch size must be at least 1"));
    }
    let (format, compression) = detect_format(path)
        .ok_or_else(|| anyhow!("{} is not a .csv or .json file", path.display()))?;
    let reader = compression::open(path, compression)?;
    match format {
        InputFormat::Csv => csv::stream_csv(reader, batch_size, &mut on_batch),
        InputFormat::Json => json::stream_json(reader, batch_size, &mut on_batch),
    }
}

/// Accumulates records and flushes them to the callback in fixed-size chunks.
pub(crate) struct Batcher<'a, F> {
    buf: Vec<Record>,
    size: usize,
    on_batch: &'a mut F,
}

impl<'a, F> Batcher<'a, F>
where
    F: FnMut(Vec<Record>) -> Result<()>,
{
    pub(crate) fn new(size: usize, on_batch: &'a mut F) -> Self {
        Self { buf: Vec::with_capacity(size.min(1024)), size, on_batch }
    }

    pub(crate) fn push(&mut self, rec: Record) -> Result<()> {
        self.buf.push(rec);
        if self.buf.len() >= self.size {
            self.flush()?;
        }
        Ok(())
    }

    /// Deliver whatever is buffered. An empty buffer is not delivered.
    pub(crate) fn flush(&mut self) -> Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let batch = std::mem::take(&mut self.buf);
        (self.on_batch)(batch)
    }
}
