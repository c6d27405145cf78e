//! Overlap policy for re-entrant job executions.
//!
//! The base scheduling model places no re-entrancy guard on jobs: a job
//! still running when its next occurrence arrives starts a second concurrent
//! execution. Callers that need at-most-one-execution-per-job opt into
//! `OverlapPolicy::Skip`, which drops the new dispatch while a previous run
//! holds the guard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Policy applied when a job becomes due while a previous execution of the
/// same job is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OverlapPolicy {
    /// Allow concurrent executions of the same job (default).
    #[default]
    Concurrent,

    /// Skip the new dispatch while a previous run is still active.
    Skip,
}

/// Per-job running-state guard.
///
/// Acquisition is lock-free; the returned [`RunGuard`] releases the flag on
/// drop, so the slot is freed even if the execution panics.
pub struct OverlapGuard {
    running: Arc<AtomicBool>,
    policy: OverlapPolicy,
}

impl OverlapGuard {
    /// Create a guard with the given policy.
    pub fn new(policy: OverlapPolicy) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            policy,
        }
    }

    /// Try to claim an execution slot.
    ///
    /// Under `Skip`, returns `None` while a previous run holds the slot.
    /// Under `Concurrent`, always succeeds.
    pub fn try_acquire(&self) -> Option<RunGuard> {
        match self.policy {
            OverlapPolicy::Skip => self
                .running
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
                .then(|| RunGuard {
                    flag: self.running.clone(),
                }),
            OverlapPolicy::Concurrent => Some(RunGuard {
                // Per-execution flag; concurrent runs do not contend
                flag: Arc::new(AtomicBool::new(true)),
            }),
        }
    }

    /// Whether an execution currently holds the shared slot.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// The configured policy.
    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }
}

/// RAII handle for one claimed execution slot.
pub struct RunGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_concurrent() {
        assert_eq!(OverlapPolicy::default(), OverlapPolicy::Concurrent);
    }

    #[test]
    fn test_skip_blocks_second_acquisition() {
        let guard = OverlapGuard::new(OverlapPolicy::Skip);

        let first = guard.try_acquire();
        assert!(first.is_some());
        assert!(guard.is_running());

        assert!(guard.try_acquire().is_none());

        drop(first);
        assert!(!guard.is_running());
        assert!(guard.try_acquire().is_some());
    }

    #[test]
    fn test_concurrent_allows_multiple() {
        let guard = OverlapGuard::new(OverlapPolicy::Concurrent);

        let a = guard.try_acquire();
        let b = guard.try_acquire();
        assert!(a.is_some());
        assert!(b.is_some());
    }

    #[test]
    fn test_guard_released_across_threads() {
        use std::thread;
        use std::time::Duration;

        let guard = Arc::new(OverlapGuard::new(OverlapPolicy::Skip));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let guard = guard.clone();
                thread::spawn(move || {
                    if let Some(_slot) = guard.try_acquire() {
                        thread::sleep(Duration::from_millis(5));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(!guard.is_running());
    }
}
