//! In-memory job store for tests and embedded use.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use portal_types::JobRecord;

use crate::{JobStore, StoreError};

/// In-memory job store. Records do not survive a restart.
#[derive(Default)]
pub struct MemoryJobStore {
    records: RwLock<HashMap<Uuid, JobRecord>>,
}

impl MemoryJobStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn save(&self, record: &JobRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<Option<JobRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.get(&id).cloned())
    }

    async fn load_all(&self) -> Result<Vec<JobRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.values().cloned().collect())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        records.remove(&id);
        Ok(())
    }

    async fn mark_executed(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        record.last_executed_at = Some(at);
        Ok(())
    }
}
