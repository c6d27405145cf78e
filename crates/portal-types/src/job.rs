//! Durable job record for recurring tasks.
//!
//! A `JobRecord` is the persisted truth about a scheduled task: which action
//! it runs, on what cron schedule, and when it last completed successfully.
//! The in-memory schedule map is reconstructed from these records at startup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted recurring-job definition.
///
/// Created when a task is registered; `last_executed_at` is `None` until the
/// first successful execution and is updated only after the bound action
/// completes without error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Unique job identifier, generated at creation.
    pub id: Uuid,

    /// 5-field cron expression (minute hour day-of-month month day-of-week).
    /// Always valid at the time it is persisted.
    pub cron_expression: String,

    /// Logical name of the operation this job runs.
    pub action_id: String,

    /// Completion time of the last successful execution, if any.
    #[serde(default)]
    pub last_executed_at: Option<DateTime<Utc>>,
}

impl JobRecord {
    /// Create a new job record with a fresh id and no execution history.
    pub fn new(cron_expression: impl Into<String>, action_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            cron_expression: cron_expression.into(),
            action_id: action_id.into(),
            last_executed_at: None,
        }
    }
}
