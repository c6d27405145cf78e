//! Scheduler configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Fallback polling interval in seconds, used when no scheduled job has
    /// a future occurrence. Keeps the loop responsive to newly registered
    /// jobs instead of sleeping indefinitely. Defaults to 10 seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Timeout in seconds for graceful shutdown. In-flight jobs are given
    /// this much time to finish before shutdown stops waiting on them.
    /// Defaults to 30 seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Maximum random delay in seconds applied to catalog jobs registered
    /// under one shared schedule. 0 disables jitter.
    #[serde(default)]
    pub catalog_jitter_secs: u64,
}

fn default_poll_interval() -> u64 {
    10
}

fn default_shutdown_timeout() -> u64 {
    30
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            catalog_jitter_secs: 0,
        }
    }
}
