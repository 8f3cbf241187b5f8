//! File-backed store for submissions awaiting delivery
//!
//! All records live in one JSON file which is rewritten atomically on every
//! change. The in-memory list only moves once the file has been written.

use super::types::{StoreFile, SubmissionRecord};
use crate::error::{Error, Result};
use crate::types::{FormKind, JsonValue};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

/// File name inside the fallback directory
pub const STORE_FILE_NAME: &str = "submissions.json";

/// Persisted queue of undelivered submissions
#[derive(Debug)]
pub struct SubmissionStore {
    /// Empty for an in-memory store
    path: PathBuf,
    records: RwLock<Vec<SubmissionRecord>>,
}

impl SubmissionStore {
    /// Open the store in `dir`, loading existing records if present
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join(STORE_FILE_NAME);
        let records = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| Error::store(format!("Failed to read store file: {e}")))?;
            let file: StoreFile = serde_json::from_str(&contents)
                .map_err(|e| Error::store(format!("Failed to parse store file: {e}")))?;
            file.submissions
        } else {
            Vec::new()
        };

        debug!(path = %path.display(), pending = records.len(), "submission store opened");
        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    /// A store that never touches the disk
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            records: RwLock::new(Vec::new()),
        }
    }

    /// Location of the store file, `None` when in memory
    pub fn path(&self) -> Option<&Path> {
        (!self.path.as_os_str().is_empty()).then_some(self.path.as_path())
    }

    /// Record a submission and persist
    pub async fn append(&self, form: FormKind, payload: JsonValue) -> Result<SubmissionRecord> {
        let mut records = self.records.write().await;
        let now = Utc::now();
        let stamp = now.format("%Y%m%d%H%M%S%3f").to_string();
        let mut seq = records.len() + 1;
        let mut id = format!("{}-{stamp}-{seq}", form.as_str());
        while records.iter().any(|r| r.id == id) {
            seq += 1;
            id = format!("{}-{stamp}-{seq}", form.as_str());
        }

        let record = SubmissionRecord {
            id,
            form,
            payload,
            submitted_at: now,
            attempts: 0,
        };
        let mut staged = records.clone();
        staged.push(record.clone());
        self.save(&staged).await?;
        *records = staged;
        Ok(record)
    }

    /// Every stored record, oldest first
    pub async fn list(&self) -> Vec<SubmissionRecord> {
        self.records.read().await.clone()
    }

    /// Stored records of one form
    pub async fn pending(&self, form: FormKind) -> Vec<SubmissionRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.form == form)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Drop a record; returns whether it existed
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let mut records = self.records.write().await;
        let staged: Vec<SubmissionRecord> =
            records.iter().filter(|r| r.id != id).cloned().collect();
        if staged.len() == records.len() {
            return Ok(false);
        }
        self.save(&staged).await?;
        *records = staged;
        Ok(true)
    }

    /// Count one more failed delivery of a record
    pub async fn record_attempt(&self, id: &str) -> Result<()> {
        let mut records = self.records.write().await;
        let Some(index) = records.iter().position(|r| r.id == id) else {
            return Ok(());
        };
        let mut staged = records.clone();
        staged[index].attempts += 1;
        self.save(&staged).await?;
        *records = staged;
        Ok(())
    }

    async fn save(&self, records: &[SubmissionRecord]) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Ok(());
        }

        let file = StoreFile {
            submissions: records.to_vec(),
        };
        let contents = serde_json::to_string_pretty(&file)
            .map_err(|e| Error::store(format!("Failed to serialize submissions: {e}")))?;

        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| Error::store(format!("Failed to create store directory: {e}")))?;
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::store(format!("Failed to write store file: {e}")))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::store(format!("Failed to rename store file: {e}")))?;

        Ok(())
    }
}
