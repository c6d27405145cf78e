//! File-system backed job store.
//!
//! One JSON file per job record, named by the job id. Records written here
//! survive process restarts; the scheduler reloads them at startup and
//! re-resolves their actions by name.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use portal_types::JobRecord;

use crate::{JobStore, StoreError};

/// File-system based job store.
pub struct FileJobStore {
    jobs_dir: PathBuf,
}

impl FileJobStore {
    /// Create a new file-based job store rooted at `jobs_dir`.
    ///
    /// The directory is created if it does not exist.
    pub async fn new(jobs_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let jobs_dir = jobs_dir.into();
        fs::create_dir_all(&jobs_dir).await?;
        debug!("FileJobStore initialized at {:?}", jobs_dir);
        Ok(Self { jobs_dir })
    }

    fn record_path(&self, id: Uuid) -> PathBuf {
        self.jobs_dir.join(format!("{}.json", id))
    }
}

#[async_trait]
impl JobStore for FileJobStore {
    async fn save(&self, record: &JobRecord) -> Result<(), StoreError> {
        let path = self.record_path(record.id);
        let content = serde_json::to_string_pretty(record)?;
        fs::write(&path, content).await?;
        debug!(job = %record.id, action = %record.action_id, "Saved job record");
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<Option<JobRecord>, StoreError> {
        let path = self.record_path(id);
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn load_all(&self) -> Result<Vec<JobRecord>, StoreError> {
        let mut records = Vec::new();
        let mut entries = fs::read_dir(&self.jobs_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            // A corrupt record must never abort a full load
            match fs::read_to_string(&path).await {
                Ok(content) => match serde_json::from_str::<JobRecord>(&content) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        warn!("Failed to deserialize job record {:?}: {}", path, e);
                    }
                },
                Err(e) => {
                    warn!("Failed to read job record {:?}: {}", path, e);
                }
            }
        }

        debug!("Loaded {} job records from {:?}", records.len(), self.jobs_dir);
        Ok(records)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let path = self.record_path(id);
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(job = %id, "Deleted job record");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn mark_executed(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut record = self.load(id).await?.ok_or(StoreError::NotFound(id))?;
        record.last_executed_at = Some(at);
        self.save(&record).await
    }
}
