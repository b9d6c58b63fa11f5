//! Transparent decompression of input files, detected by extension.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Zstd,
}

impl Compression {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("gz") => Compression::Gzip,
            Some(ext) if ext.eq_ignore_ascii_case("zst") => Compression::Zstd,
            _ => Compression::None,
        }
    }
}

/// Open `path` for buffered reading, wrapping it in the matching decoder.
pub fn open(path: &Path, compression: Compression) -> Result<Box<dyn Read>> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let r: Box<dyn Read> = match compression {
        Compression::None => Box::new(BufReader::new(f)),
        Compression::Gzip => Box::new(BufReader::new(flate2::read::MultiGzDecoder::new(f))),
        Compression::Zstd => Box::new(BufReader::new(
            zstd::Decoder::new(f).with_context(|| format!("zstd decoder for {}", path.display()))?,
        )),
    };
    Ok(r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_gzip_and_zstd() -> Result<()> {
        let dir = tempfile::tempdir()?;

        let gz = dir.path().join("a.csv.gz");
        let mut enc = flate2::write::GzEncoder::new(File::create(&gz)?, flate2::Compression::default());
        enc.write_all(b"id\n1\n")?;
        enc.finish()?;

        let zst = dir.path().join("a.csv.zst");
        let mut enc = zstd::Encoder::new(File::create(&zst)?, 3)?;
        enc.write_all(b"id\n2\n")?;
        enc.finish()?;

        for (p, want) in [(gz, "id\n1\n"), (zst, "id\n2\n")] {
            let mut s = String::new();
            open(&p, Compression::from_path(&p))?.read_to_string(&mut s)?;
            assert_eq!(s, want);
        }
        Ok(())
    }
}
