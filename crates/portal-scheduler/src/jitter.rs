//! Startup jitter for catalog-registered maintenance jobs.
//!
//! Portal instances in the same office tend to share one catalog cron, so
//! without jitter every instance fires its sweeps at the same instant. A
//! random pre-execution delay spreads that load out.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Maximum random delay applied before a maintenance run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct JitterConfig {
    /// Maximum jitter in seconds (0 disables jitter).
    pub max_jitter_secs: u64,
}

impl JitterConfig {
    /// Create a configuration with the given maximum delay.
    pub fn new(max_jitter_secs: u64) -> Self {
        Self { max_jitter_secs }
    }

    /// No delay.
    pub fn none() -> Self {
        Self { max_jitter_secs: 0 }
    }

    /// Pick a random delay in `[0, max_jitter_secs)`.
    ///
    /// Returns `Duration::ZERO` when jitter is disabled.
    pub fn generate_jitter(&self) -> Duration {
        if self.max_jitter_secs == 0 {
            return Duration::ZERO;
        }
        let jitter_ms = rand::thread_rng().gen_range(0..self.max_jitter_secs * 1000);
        Duration::from_millis(jitter_ms)
    }

    /// Whether a non-zero delay can be produced.
    pub fn is_enabled(&self) -> bool {
        self.max_jitter_secs > 0
    }
}

/// Run `job_fn` after a random delay of up to `max_jitter_secs` seconds.
pub async fn with_jitter<F, T>(max_jitter_secs: u64, job_fn: F) -> T
where
    F: std::future::Future<Output = T>,
{
    if max_jitter_secs > 0 {
        let jitter = JitterConfig::new(max_jitter_secs).generate_jitter();
        if !jitter.is_zero() {
            tracing::debug!(jitter_ms = jitter.as_millis(), "Applying jitter delay");
            tokio::time::sleep(jitter).await;
        }
    }
    job_fn.await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_jitter_is_immediate() {
        let config = JitterConfig::none();
        assert_eq!(config.generate_jitter(), Duration::ZERO);
        assert!(!config.is_enabled());
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let config = JitterConfig::new(10);
        assert!(config.is_enabled());

        for _ in 0..100 {
            assert!(config.generate_jitter() < Duration::from_secs(10));
        }
    }

    #[test]
    fn test_jitter_varies() {
        let config = JitterConfig::new(10);
        let unique: std::collections::HashSet<_> = (0..1000)
            .map(|_| config.generate_jitter().as_millis())
            .collect();
        assert!(unique.len() > 1, "jitter should produce varied values");
    }

    #[tokio::test]
    async fn test_with_jitter_zero_runs_immediately() {
        let start = std::time::Instant::now();
        let result = with_jitter(0, async { 42 }).await;

        assert_eq!(result, 42);
        assert!(start.elapsed() < Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_with_jitter_returns_value() {
        let result = with_jitter(1, async { "done" }).await;
        assert_eq!(result, "done");
    }
}
