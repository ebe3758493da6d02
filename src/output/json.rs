use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use serde::Serialize;

/// Pretty JSON for a page, vehicle or comparison
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize results")
}

/// Write results as JSON atomically, so readers never see a partial file.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, value).context("Failed to serialize results")?;
    file.write_all(b"\n")
        .with_context(|| format!("Failed to write {}", path.display()))?;

    file.commit()
        .with_context(|| format!("Failed to save results to {}", path.display()))?;

    Ok(())
}
