use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Streams items into a single JSON array without holding them in memory.
///
/// Layout is `[`, then `\n` before the first item and `,\n` before every
/// later one, then `\n]` on [`finish`](Self::finish). Zero items give `[\n]`.
pub struct JsonArrayWriter<W: Write> {
    out: W,
    first: bool,
    written: u64,
}

impl JsonArrayWriter<BufWriter<File>> {
    /// Truncate `path` and start a new array in it.
    pub fn create(path: &Path) -> Result<Self> {
        let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
        Self::new(BufWriter::new(f)).with_context(|| format!("write {}", path.display()))
    }
}

impl<W: Write> JsonArrayWriter<W> {
    pub fn new(mut out: W) -> Result<Self> {
        out.write_all(b"[")?;
        Ok(Self { out, first: true, written: 0 })
    }

    pub fn write_item<T: Serialize>(&mut self, item: &T) -> Result<()> {
        let sep: &[u8] = if self.first { b"\n" } else { b",\n" };
        self.out.write_all(sep)?;
        serde_json::to_writer_pretty(&mut self.out, item).context("serialize detail entry")?;
        self.first = false;
        self.written += 1;
        Ok(())
    }

    pub fn items_written(&self) -> u64 {
        self.written
    }

    /// Close the array and flush, handing back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.out.write_all(b"\n]")?;
        self.out.flush()?;
        Ok(self.out)
    }
}
