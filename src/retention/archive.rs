// src/retention/archive.rs

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::fs::FileSystem;

/// `{prefix}_archive_{YYYYmmddHHMMSS}.zip`
pub fn archive_file_name(prefix: &str, at: DateTime<Local>) -> String {
    format!("{}_archive_{}.zip", prefix, at.format("%Y%m%d%H%M%S"))
}

/// First free archive path in `archive_dir`; appends `_1`, `_2`, ... when two
/// sweeps land in the same second.
pub fn unique_archive_path(
    fs: &dyn FileSystem,
    archive_dir: &Path,
    prefix: &str,
    at: DateTime<Local>,
) -> PathBuf {
    let base = archive_file_name(prefix, at);
    let candidate = archive_dir.join(&base);
    if !fs.exists(&candidate) {
        return candidate;
    }
    let stem = base.trim_end_matches(".zip");
    (1u32..)
        .map(|n| archive_dir.join(format!("{stem}_{n}.zip")))
        .find(|p| !fs.exists(p))
        .unwrap_or(candidate)
}

/// Zip `files` into memory, each stored Deflate-compressed under its bare
/// file name.
pub fn build_archive(fs: &dyn FileSystem, files: &[PathBuf]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in files {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("file name of {:?} is not valid UTF-8", path))?;
        let contents = fs.read(path)?;
        zip.start_file(name, options)
            .with_context(|| format!("adding {name} to archive"))?;
        zip.write_all(&contents)
            .with_context(|| format!("writing {name} to archive"))?;
    }

    let cursor = zip.finish().context("finishing archive")?;
    Ok(cursor.into_inner())
}
