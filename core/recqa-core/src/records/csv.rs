use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::io::Read;

use super::{Batcher, Record, COLLECTION_FIELD};

/// Decode CSV rows into records. The first row is the header; every cell is
/// kept as a string. A `_collection` column sets the record's collection.
pub fn stream_csv<R, F>(reader: R, batch_size: usize, on_batch: &mut F) -> Result<()>
where
    R: Read,
    F: FnMut(Vec<Record>) -> Result<()>,
{
    let mut rdr = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);
    let headers = rdr.headers().context("read CSV header")?.clone();

    let mut batcher = Batcher::new(batch_size, on_batch);
    for (i, row) in rdr.records().enumerate() {
        let row = row.with_context(|| format!("parse CSV record #{}", i + 1))?;
        let mut data = Map::with_capacity(headers.len());
        for (h, cell) in headers.iter().zip(row.iter()) {
            data.insert(h.to_string(), Value::String(cell.to_string()));
        }
        let rec = match data.remove(COLLECTION_FIELD) {
            Some(Value::String(c)) => Record::new(c, data),
            _ => Record::new("", data),
        };
        batcher.push(rec)?;
    }
    batcher.flush()
}
