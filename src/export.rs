//! File exports (analytics CSV, database table dumps).
//!
//! Files are written to a temp file inside the export directory first and
//! renamed on success, so an interrupted write never leaves a partial file
//! under the final name.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::config;
use crate::error::Result;
use crate::models::{DateRange, Table};

/// Writes exported blobs into a single directory.
#[derive(Debug, Clone)]
pub struct ExportWriter {
    /// Directory receiving exported files.
    pub dir: PathBuf,
}

impl ExportWriter {
    /// Create a writer for `dir`, or the platform download directory when `None`.
    ///
    /// Creates the directory if it does not exist.
    pub fn new(dir: Option<PathBuf>) -> Result<Self> {
        let dir = dir.unwrap_or_else(config::default_export_dir);
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Write `contents` to `<dir>/<file_name>`, replacing any existing file.
    pub fn write(&self, file_name: &str, contents: &[u8]) -> Result<PathBuf> {
        let dest = self.dir.join(file_name);
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(contents)?;
        tmp.flush()?;
        tmp.persist(&dest).map_err(|e| e.error)?;
        info!(path = %dest.display(), bytes = contents.len(), "export written");
        Ok(dest)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// `analytics_<start>_<end>.csv`
pub fn analytics_file_name(range: &DateRange) -> String {
    format!("analytics_{}_{}.csv", range.start_str(), range.end_str())
}

/// `<table>_export_<YYYY-MM-DD>.csv`
pub fn table_export_file_name(table: Table, day: NaiveDate) -> String {
    format!("{}_export_{}.csv", table.as_str(), day.format("%Y-%m-%d"))
}
