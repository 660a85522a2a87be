use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::Record;

/// Write `records` as CSV with the source header. Unknown year / publisher
/// become empty cells.
pub fn write_csv<'a, W, I>(output: W, records: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Record>,
{
    let mut writer = csv::Writer::from_writer(output);
    let mut written = 0;
    for rec in records {
        writer
            .serialize(rec)
            .with_context(|| format!("writing record {written}"))?;
        written += 1;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(written)
}

/// Export to a file, replacing it if present.
pub fn save_csv<'a, I>(path: &Path, records: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a Record>,
{
    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let written = write_csv(file, records)?;
    log::info!("Exported {written} records to {}", path.display());
    Ok(written)
}
