//! Durable persistence for recurring-job records.
//!
//! The store owns durable truth: the scheduler's in-memory schedule map is a
//! working set reconstructed from these records at startup. All operations
//! are short-lived; no store transaction ever spans a job's execution.

mod error;
mod file;
mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use portal_types::JobRecord;

pub use error::StoreError;
pub use file::FileJobStore;
pub use memory::MemoryJobStore;

/// Job record persistence contract.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persist a job record, replacing any existing record with the same id.
    async fn save(&self, record: &JobRecord) -> Result<(), StoreError>;

    /// Load a job record by id.
    async fn load(&self, id: Uuid) -> Result<Option<JobRecord>, StoreError>;

    /// Load all persisted job records.
    async fn load_all(&self) -> Result<Vec<JobRecord>, StoreError>;

    /// Delete a job record. A no-op if the id is unknown.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Record a successful execution by setting `last_executed_at`.
    async fn mark_executed(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError>;
}
