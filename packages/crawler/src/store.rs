//! Durable crawl state: the content store and the audit log.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::error::Result;

/// Suffix for files still being written.
const PARTIAL_SUFFIX: &str = ".part";

/// Directory of downloaded files keyed by filename.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    /// Open the store, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    pub fn exists(&self, filename: &str) -> bool {
        self.path_for(filename).exists()
    }

    /// Write `bytes` under `filename`.
    ///
    /// Bytes go to `<filename>.part` first and are renamed into place, so an
    /// interrupted write never leaves a file that `exists` reports.
    pub fn put(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let target = self.path_for(filename);
        let partial = self.root.join(format!("{filename}{PARTIAL_SUFFIX}"));

        fs::write(&partial, bytes)?;
        if let Err(e) = fs::rename(&partial, &target) {
            let _ = fs::remove_file(&partial);
            return Err(e.into());
        }
        Ok(target)
    }
}

/// One successful download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    pub filename: String,
    pub source_url: String,
    #[serde(serialize_with = "serialize_rfc3339")]
    pub downloaded_at: DateTime<Utc>,
}

fn serialize_rfc3339<S>(at: &DateTime<Utc>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&at.to_rfc3339())
}

impl AuditRecord {
    pub fn now(filename: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            source_url: source_url.into(),
            downloaded_at: Utc::now(),
        }
    }
}

/// Append-only CSV log with columns `filename,source_url,downloaded_at`.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row, writing the header first if the log is new or empty.
    pub fn append(&self, record: &AuditRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let is_new = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }
}
